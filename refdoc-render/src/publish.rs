use crate::error::RenderError;
use crate::markdown::{render, AssetCopy, RenderContext};
use crate::page::{render_page, PageData};
use std::fs;
use std::path::{Path, PathBuf};

/// One page to publish into the site tree.
#[derive(Debug, Clone)]
pub struct PublishSpec {
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub out_dir: PathBuf,
    pub template: Option<PathBuf>,
}

impl PublishSpec {
    pub fn new(output: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Self {
        Self {
            input: None,
            output: output.as_ref().to_path_buf(),
            out_dir: out_dir.as_ref().to_path_buf(),
            template: None,
        }
    }

    pub fn with_input(mut self, path: impl AsRef<Path>) -> Self {
        self.input = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_template(mut self, path: impl AsRef<Path>) -> Self {
        self.template = Some(path.as_ref().to_path_buf());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishResult {
    pub output: PathBuf,
    pub assets: Vec<AssetCopy>,
}

/// Render the input page and write it, along with its images, into the site tree.
///
/// `base` supplies the project root and rendering policies; the document path and output
/// directory come from `spec`. Nothing is written unless rendering and templating succeed.
pub fn publish(spec: &PublishSpec, base: &RenderContext) -> Result<PublishResult, RenderError> {
    let markdown = match &spec.input {
        Some(path) => read(path)?,
        None => String::new(),
    };

    let mut ctx = base.clone().with_out_dir(&spec.out_dir);
    if let Some(input) = &spec.input {
        ctx.document = input.clone();
    }
    let rendered = render(&markdown, &ctx)?;

    let html = match &spec.template {
        Some(template_path) => {
            let template = read(template_path)?;
            let data = PageData::for_output(rendered.html, &spec.output)?;
            render_page(&template_path.to_string_lossy(), &template, &data)?
        }
        None => rendered.html,
    };

    for asset in &rendered.assets {
        copy_asset(asset)?;
    }
    write_to_path(&spec.output, html.as_bytes())?;
    tracing::info!(
        output = %spec.output.display(),
        assets = rendered.assets.len(),
        "published page"
    );

    Ok(PublishResult {
        output: spec.output.clone(),
        assets: rendered.assets,
    })
}

fn read(path: &Path) -> Result<String, RenderError> {
    fs::read_to_string(path).map_err(|err| RenderError::io(path, err))
}

fn copy_asset(asset: &AssetCopy) -> Result<(), RenderError> {
    ensure_parent(&asset.destination)?;
    fs::copy(&asset.source, &asset.destination)
        .map(|_| ())
        .map_err(|err| RenderError::io(&asset.source, err))
}

fn ensure_parent(path: &Path) -> Result<(), RenderError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| RenderError::io(parent, err))
        }
        _ => Ok(()),
    }
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub fn write_to_path(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    ensure_parent(path)?;
    fs::write(path, bytes).map_err(|err| RenderError::io(path, err))
}
