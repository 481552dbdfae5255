use anyhow::{Context, Result};
use boxgrid_layout::{
    CellBuffer, LayoutTree, NoStyle, RenderOptions, compute, hit_test, load_document_from_reader,
    render_with,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn load(path: &Path) -> Result<LayoutTree> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    load_document_from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid layout document {}", path.display()))
}

/// Lay out and draw `tree` into an in-memory grid and return its rows.
pub fn render_lines(
    tree: &mut LayoutTree,
    width: u16,
    height: u16,
    options: &RenderOptions,
) -> Result<Vec<String>> {
    compute(tree, width, height).context("Layout failed")?;
    let mut buf = CellBuffer::new(width, height);
    render_with(tree, &mut buf, &NoStyle, options).context("Render failed")?;
    Ok(buf.to_lines())
}

/// Name of the node at `(x, y)`, `kind#id` when it has none, or `none`.
pub fn describe_hit(tree: &mut LayoutTree, width: u16, height: u16, x: i32, y: i32) -> Result<String> {
    compute(tree, width, height).context("Layout failed")?;
    let Some(id) = hit_test(tree, x, y)? else {
        return Ok("none".to_string());
    };
    let description = match tree.node(id) {
        Some(node) => match node.name() {
            Some(name) => name.to_string(),
            None => format!("{}#{}", node.kind.as_str(), id.index()),
        },
        None => "none".to_string(),
    };
    Ok(description)
}
