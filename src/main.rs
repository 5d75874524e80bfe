//! Command-line front end: render annotated images and validate documents.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::run()
}

// The library is usable on wasm, the CLI is not
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    use filla_annotate::render::{RasterSurface, load_background, render_frame};
    use filla_annotate::{
        AnnotationDocument, AnnotationEditor, BackgroundError, DocumentError, EditorConfig,
        RenderError, Tool,
    };

    const USAGE: &str = "Usage:
  filla-annotate-cli render <image> <annotations.json> <out.png> [--width W] [--height H]
  filla-annotate-cli check <annotations.json>";

    #[derive(Debug, thiserror::Error)]
    enum CliError {
        #[error("{0}")]
        Usage(String),

        #[error("{0}")]
        Document(#[from] DocumentError),

        #[error("Failed to load image: {0}")]
        Background(#[from] BackgroundError),

        #[error("Failed to render: {0}")]
        Render(#[from] RenderError),

        #[error("Failed to write {path:?}: {source}")]
        Output {
            path: PathBuf,
            source: image::ImageError,
        },

        #[error("{invalid} of {total} annotations are invalid")]
        Invalid { invalid: usize, total: usize },
    }

    pub fn run() -> ExitCode {
        let config = EditorConfig::load_from_default_path().unwrap_or_default();
        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let args: Vec<String> = std::env::args().skip(1).collect();
        match execute(&args, &config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(CliError::Usage(message)) => {
                eprintln!("{}\n\n{}", message, USAGE);
                ExitCode::from(2)
            }
            Err(e) => {
                log::error!("{}", e);
                ExitCode::FAILURE
            }
        }
    }

    fn execute(args: &[String], config: &EditorConfig) -> Result<(), CliError> {
        match args.first().map(String::as_str) {
            Some("render") => render(&args[1..], config),
            Some("check") => check(&args[1..]),
            Some(other) => Err(CliError::Usage(format!("Unknown command: {}", other))),
            None => Err(CliError::Usage("Missing command".to_string())),
        }
    }

    fn parse_dimension(flag: &str, value: Option<&String>) -> Result<u32, CliError> {
        value
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .ok_or_else(|| CliError::Usage(format!("{} expects a positive integer", flag)))
    }

    fn render(args: &[String], config: &EditorConfig) -> Result<(), CliError> {
        let mut positional = Vec::new();
        let mut width = None;
        let mut height = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--width" => width = Some(parse_dimension("--width", iter.next())?),
                "--height" => height = Some(parse_dimension("--height", iter.next())?),
                _ => positional.push(arg.as_str()),
            }
        }
        let &[image_path, document_path, out_path] = positional.as_slice() else {
            return Err(CliError::Usage(
                "render expects <image> <annotations.json> <out.png>".to_string(),
            ));
        };

        let image = load_background(Path::new(image_path))?;
        let document = AnnotationDocument::load(Path::new(document_path))?;
        let canvas_w = width.unwrap_or(image.width());
        let canvas_h = height.unwrap_or(image.height());
        let count = document.annotations.len();

        let mut editor =
            AnnotationEditor::new(document.image_url, document.annotations, config.editor.clone());
        editor.set_image(image);
        editor.set_canvas_size(canvas_w, canvas_h);

        let mut surface = RasterSurface::new(canvas_w, canvas_h).with_clear_color([0, 0, 0, 0xFF]);
        render_frame(&mut surface, &editor.frame())?;
        surface
            .save_png(Path::new(out_path))
            .map_err(|source| CliError::Output {
                path: PathBuf::from(out_path),
                source,
            })?;

        log::info!(
            "🖼️ Rendered {} annotations ({}x{}) to {}",
            count,
            canvas_w,
            canvas_h,
            out_path
        );
        Ok(())
    }

    fn check(args: &[String]) -> Result<(), CliError> {
        let [path] = args else {
            return Err(CliError::Usage("check expects <annotations.json>".to_string()));
        };
        let document = AnnotationDocument::load(Path::new(path))?;
        let total = document.annotations.len();

        println!("{}: {} annotations on {}", path, total, document.image_url);
        for tool in Tool::all() {
            let count = document
                .annotations
                .iter()
                .filter(|a| a.shape.tool() == *tool)
                .count();
            if count > 0 {
                println!("  {:<7} {}", tool.name(), count);
            }
        }

        let mut invalid = 0;
        for ann in &document.annotations {
            let in_range = ann
                .anchor_points()
                .iter()
                .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y));
            if !ann.has_finite_geometry() || !in_range {
                println!("  invalid: {} ({})", ann.id, ann.shape.kind());
                invalid += 1;
            }
        }

        if invalid > 0 {
            return Err(CliError::Invalid { invalid, total });
        }
        Ok(())
    }
}
