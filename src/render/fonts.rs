use std::path::Path;
use std::sync::Arc;

use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

use crate::assets::fetch::truncate_for_log;

/// File extensions picked up from a fonts directory.
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// Families appended to every note's own list so some face always matches.
const GENERIC_FALLBACKS: &[Family<'static>] =
    &[Family::SansSerif, Family::Serif, Family::Monospace];

/// Build the font database shared by text measurement and rasterization.
///
/// System fonts are always loaded; `fonts_dir` (and its `fonts/` subdirectory) add to them.
pub fn build_fontdb(fonts_dir: Option<&Path>) -> Arc<Database> {
    let mut db = Database::new();
    db.load_system_fonts();

    if let Some(dir) = fonts_dir {
        for candidate in [dir.to_path_buf(), dir.join("fonts")] {
            let added = load_font_files(&mut db, &candidate);
            tracing::debug!(dir = %candidate.display(), added, "scanned fonts directory");
        }
    }
    tracing::debug!(faces = db.len(), "font database ready");

    Arc::new(db)
}

fn is_font_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| {
                FONT_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
}

/// Load every font file directly inside `dir`; returns how many faces were added.
fn load_font_files(db: &mut Database, dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    let before = db.len();
    for path in entries.flatten().map(|e| e.path()).filter(|p| is_font_file(p)) {
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
    db.len() - before
}

/// Parser options used for every usvg parse in the crate.
///
/// Text lays out with `fontdb` through [`collage_font_resolver`]. Only `data:` image references
/// are loaded; any other locator is logged and dropped, so parsing never touches the network
/// or the filesystem.
pub fn usvg_options(fontdb: Arc<Database>) -> usvg::Options<'static> {
    usvg::Options {
        fontdb,
        font_resolver: collage_font_resolver(),
        image_href_resolver: usvg::ImageHrefResolver {
            resolve_data: usvg::ImageHrefResolver::default_data_resolver(),
            resolve_string: Box::new(|href: &str, _: &usvg::Options| {
                tracing::warn!(
                    href = %truncate_for_log(href),
                    "external image reference left out of raster"
                );
                None
            }),
        },
        ..Default::default()
    }
}

/// Font resolver that lands on some face whenever the database holds any.
///
/// A note's own families are tried first, then [`GENERIC_FALLBACKS`], then the first face.
pub fn collage_font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, db| {
            let families = query_families(font.families());
            let query = Query {
                families: &families,
                weight: Weight(font.weight()),
                stretch: db_stretch(font.stretch()),
                style: db_style(font.style()),
            };
            db.query(&query).or_else(|| {
                tracing::debug!(families = ?font.families(), "no matching face, using first");
                db.faces().next().map(|face| face.id)
            })
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

fn query_families(requested: &[usvg::FontFamily]) -> Vec<Family<'_>> {
    requested
        .iter()
        .map(|family| match family {
            usvg::FontFamily::Serif => Family::Serif,
            usvg::FontFamily::SansSerif => Family::SansSerif,
            usvg::FontFamily::Cursive => Family::Cursive,
            usvg::FontFamily::Fantasy => Family::Fantasy,
            usvg::FontFamily::Monospace => Family::Monospace,
            usvg::FontFamily::Named(name) => Family::Name(name.as_str()),
        })
        .chain(GENERIC_FALLBACKS.iter().cloned())
        .collect()
}

fn db_stretch(stretch: usvg::FontStretch) -> Stretch {
    use usvg::FontStretch as S;
    match stretch {
        S::UltraCondensed => Stretch::UltraCondensed,
        S::ExtraCondensed => Stretch::ExtraCondensed,
        S::Condensed => Stretch::Condensed,
        S::SemiCondensed => Stretch::SemiCondensed,
        S::Normal => Stretch::Normal,
        S::SemiExpanded => Stretch::SemiExpanded,
        S::Expanded => Stretch::Expanded,
        S::ExtraExpanded => Stretch::ExtraExpanded,
        S::UltraExpanded => Stretch::UltraExpanded,
    }
}

fn db_style(style: usvg::FontStyle) -> Style {
    match style {
        usvg::FontStyle::Normal => Style::Normal,
        usvg::FontStyle::Italic => Style::Italic,
        usvg::FontStyle::Oblique => Style::Oblique,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
