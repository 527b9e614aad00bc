//! Content stream interpreter.
//!
//! Replays the text operators of a page against a [`TextState`] and hands
//! every text-show operation to a [`TextDevice`]. Graphics, path, colour and
//! marked-content operators are ignored; `Do` is only reported to an
//! optional hook because XObject content is not interpreted.

use pdftitle_core::{Ctm, TitleError};
use tracing::{debug, warn};

use crate::device::{TextDevice, TjElement};
use crate::error::BackendError;
use crate::font::FontResolver;
use crate::operator::OperatorKind;
use crate::text_state::TextState;
use crate::tokenizer::{Operand, Operator, tokenize};

/// Called with the name operand of every `Do` operator.
pub type XObjectHook<'a> = Box<dyn FnMut(&str) + 'a>;

pub struct Interpreter<'a> {
    fonts: &'a mut dyn FontResolver,
    device: &'a mut dyn TextDevice,
    state: TextState,
    on_xobject: Option<XObjectHook<'a>>,
}

impl<'a> Interpreter<'a> {
    pub fn new(fonts: &'a mut dyn FontResolver, device: &'a mut dyn TextDevice) -> Self {
        Self {
            fonts,
            device,
            state: TextState::new(),
            on_xobject: None,
        }
    }

    pub fn with_xobject_hook(mut self, hook: impl FnMut(&str) + 'a) -> Self {
        self.on_xobject = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> &TextState {
        &self.state
    }

    /// Tokenizes `content` and executes every operator in order.
    pub fn run(&mut self, content: &[u8]) -> Result<(), BackendError> {
        let operators = tokenize(content)?;
        debug!(count = operators.len(), "interpreting content stream");
        for op in &operators {
            self.execute(op)?;
        }
        Ok(())
    }

    pub fn execute(&mut self, op: &Operator) -> Result<(), BackendError> {
        let kind = OperatorKind::from_name(&op.name);
        if kind == OperatorKind::Other {
            return Ok(());
        }
        // operands come right before the operator; extra leading ones are junk
        let arity = kind.arity();
        if op.operands.len() < arity {
            warn!(
                operator = %op.name,
                expected = arity,
                got = op.operands.len(),
                "skipping operator with missing operands"
            );
            return Ok(());
        }
        let operands = &op.operands[op.operands.len() - arity..];
        debug!(operator = %op.name, ?operands, "op");

        match kind {
            OperatorKind::BeginText => self.state.begin_text(),
            OperatorKind::EndText => self.state.end_text(),

            OperatorKind::CharSpacing => {
                if let Some(v) = number(op, operands, 0) {
                    self.state.char_spacing = v;
                }
            }
            OperatorKind::WordSpacing => {
                if let Some(v) = number(op, operands, 0) {
                    self.state.word_spacing = v;
                }
            }
            OperatorKind::HorizontalScaling => {
                if let Some(v) = number(op, operands, 0) {
                    self.state.set_h_scaling(v);
                }
            }
            OperatorKind::Leading => {
                if let Some(v) = number(op, operands, 0) {
                    self.state.leading = v;
                }
            }
            OperatorKind::Font => self.select_font(op, operands)?,
            OperatorKind::RenderMode => {
                if let Some(v) = number(op, operands, 0) {
                    self.state.set_render_mode(v as i64);
                }
            }
            OperatorKind::Rise => {
                if let Some(v) = number(op, operands, 0) {
                    self.state.rise = v;
                }
            }

            OperatorKind::MoveText => {
                if let Some((tx, ty)) = pair(op, operands) {
                    let moved = self.state.move_text_position(tx, ty);
                    positioned(op, moved);
                }
            }
            OperatorKind::MoveTextSetLeading => {
                if let Some((tx, ty)) = pair(op, operands) {
                    let moved = self.state.move_text_position_and_set_leading(tx, ty);
                    positioned(op, moved);
                }
            }
            OperatorKind::TextMatrix => {
                let values: Option<Vec<f64>> = operands.iter().map(Operand::as_f64).collect();
                match values.as_deref() {
                    Some(&[a, b, c, d, e, f]) => {
                        self.state.set_text_matrix(Ctm::new(a, b, c, d, e, f));
                    }
                    _ => malformed(op),
                }
            }
            OperatorKind::NextLine => {
                let moved = self.state.move_to_next_line();
                positioned(op, moved);
            }

            OperatorKind::ShowText => {
                if let Some(bytes) = string(op, operands, 0) {
                    self.show(vec![TjElement::String(bytes.to_vec())])?;
                }
            }
            OperatorKind::NextLineShowText => {
                if let Some(bytes) = string(op, operands, 0) {
                    let moved = self.state.move_to_next_line();
                    positioned(op, moved);
                    self.show(vec![TjElement::String(bytes.to_vec())])?;
                }
            }
            OperatorKind::SpacingNextLineShowText => {
                let (Some(aw), Some(ac), Some(bytes)) = (
                    operands[0].as_f64(),
                    operands[1].as_f64(),
                    operands[2].as_bytes(),
                ) else {
                    malformed(op);
                    return Ok(());
                };
                self.state.word_spacing = aw;
                self.state.char_spacing = ac;
                let moved = self.state.move_to_next_line();
                positioned(op, moved);
                self.show(vec![TjElement::String(bytes.to_vec())])?;
            }
            OperatorKind::ShowTextArray => {
                let Operand::Array(items) = &operands[0] else {
                    malformed(op);
                    return Ok(());
                };
                let elements = items
                    .iter()
                    .filter_map(|item| match item {
                        Operand::LiteralString(b) | Operand::HexString(b) => {
                            Some(TjElement::String(b.clone()))
                        }
                        other => other.as_f64().map(TjElement::Adjustment),
                    })
                    .collect();
                self.show(elements)?;
            }

            OperatorKind::XObject => {
                if let Some(name) = operands[0].as_name() {
                    debug!(xobject = name, "XObject content is not interpreted");
                    if let Some(hook) = self.on_xobject.as_mut() {
                        hook(name);
                    }
                }
            }
            OperatorKind::Other => {}
        }
        Ok(())
    }

    fn select_font(&mut self, op: &Operator, operands: &[Operand]) -> Result<(), BackendError> {
        let (Some(name), Some(size)) = (operands[0].as_name(), operands[1].as_f64()) else {
            malformed(op);
            return Ok(());
        };
        match self.fonts.resolve(name)? {
            Some(handle) => {
                debug!(font = name, id = %handle.id, size, "font selected");
                self.state.set_font(handle, size);
                Ok(())
            }
            None => Err(TitleError::UndefinedFont(name.to_string()).into()),
        }
    }

    fn show(&mut self, elements: Vec<TjElement>) -> Result<(), BackendError> {
        self.device.show_array(&mut self.state, &elements)
    }
}

fn malformed(op: &Operator) {
    warn!(operator = %op.name, operands = ?op.operands, "skipping operator with malformed operands");
}

fn positioned(op: &Operator, moved: bool) {
    if !moved {
        warn!(operator = %op.name, "text positioning outside a text object ignored");
    }
}

fn number(op: &Operator, operands: &[Operand], index: usize) -> Option<f64> {
    let value = operands.get(index).and_then(Operand::as_f64);
    if value.is_none() {
        malformed(op);
    }
    value
}

fn pair(op: &Operator, operands: &[Operand]) -> Option<(f64, f64)> {
    Some((number(op, operands, 0)?, number(op, operands, 1)?))
}

fn string<'o>(op: &Operator, operands: &'o [Operand], index: usize) -> Option<&'o [u8]> {
    let value = operands.get(index).and_then(Operand::as_bytes);
    if value.is_none() {
        malformed(op);
    }
    value
}
