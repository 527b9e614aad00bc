use std::path::{Path, PathBuf};

use pdftitle::{Pdf, TitleError, TitleOptions, convert_ligatures, new_file_name, title_case};

use crate::cli::Cli;

pub fn run(cli: &Cli) -> Result<(), i32> {
    if !cli.pdf.exists() {
        eprintln!("Error: file not found: {}", cli.pdf.display());
        return Err(1);
    }
    let pdf = Pdf::open_file(&cli.pdf).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })?;

    let options = TitleOptions {
        page_number: cli.page_number,
        missing_char: cli.replace_missing_char.clone(),
        algorithm: cli.algo.into(),
        eliot_ranks: cli.eliot_tfs.clone(),
        translation_heuristic: cli.translation_heuristic,
    };

    if cli.list_blocks {
        return list_blocks(&pdf, &options);
    }

    let mut title = find_title(&pdf, &options, cli.use_metadata).map_err(|e| {
        report(&pdf, options.page_number, &e);
        1
    })?;

    if cli.title_case {
        log::info!("before title case: {title}");
        title = title_case(&title);
    }
    if !cli.do_not_convert_ligatures {
        title = convert_ligatures(&title);
    }

    if cli.change_name {
        let renamed = rename_after(&cli.pdf, &title).map_err(|e| {
            eprintln!("Error: failed to rename {}: {e}", cli.pdf.display());
            1
        })?;
        println!("{}", renamed.display());
    } else {
        println!("{title}");
    }
    Ok(())
}

fn find_title(pdf: &Pdf, options: &TitleOptions, use_metadata: bool) -> Result<String, TitleError> {
    if use_metadata {
        if let Some(title) = pdf.metadata_title()? {
            return Ok(title);
        }
        log::info!("no metadata title, falling back to page layout");
    }
    pdf.extract_title(options)
}

fn list_blocks(pdf: &Pdf, options: &TitleOptions) -> Result<(), i32> {
    let blocks = pdf.blocks(options).map_err(|e| {
        report(pdf, options.page_number, &e);
        1
    })?;
    for block in &blocks {
        println!(
            "{}\t{:.2}\t{:.2}\t{}\t{}",
            block.size,
            block.x,
            block.y,
            block.font_name,
            block.text()
        );
    }
    Ok(())
}

fn report(pdf: &Pdf, page_number: usize, err: &TitleError) {
    eprintln!("Error: {err}");
    let drew_xobjects = pdf
        .xobject_names(page_number)
        .is_ok_and(|names| !names.is_empty());
    if drew_xobjects {
        eprintln!(
            "Note: the page draws XObjects, whose text is not interpreted. \
             They may be the reason for this error."
        );
    }
}

/// Renames `path` within its directory to the name derived from `title`.
fn rename_after(path: &Path, title: &str) -> std::io::Result<PathBuf> {
    let name = new_file_name(title);
    let target = match path.parent() {
        Some(dir) => dir.join(&name),
        None => PathBuf::from(&name),
    };
    std::fs::rename(path, &target)?;
    Ok(target)
}
