use std::{path::Path, sync::Arc};

use anyhow::Context as _;
use usvg::fontdb;

use crate::{foundation::error::ComicResult, render::text::CaptionFont};

/// Families tried, in order, before falling back to any sans-serif face.
pub const PREFERRED_CAPTION_FAMILIES: &[&str] =
    &["Arial", "Liberation Sans", "DejaVu Sans", "Noto Sans", "Helvetica"];

/// Shared font database used for captions and the placeholder image.
///
/// Loading system fonts scans the filesystem, so build one library per process and clone the
/// handle (an `Arc`) into the components that need it.
#[derive(Clone)]
pub struct FontLibrary {
    db: Arc<fontdb::Database>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.face_count())
            .finish()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontLibrary {
    /// Library with every font the platform exposes.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if let Some(family) = preferred_family(&db) {
            db.set_sans_serif_family(family.clone());
            tracing::debug!(faces = db.len(), sans_serif = %family, "loaded system fonts");
        } else {
            tracing::debug!(faces = db.len(), "loaded system fonts");
        }
        Self { db: Arc::new(db) }
    }

    /// Library with no fonts. Text is skipped wherever it would be drawn.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }

    /// Add a `.ttf`/`.otf`/`.ttc` file to the library.
    pub fn with_font_file(mut self, path: &Path) -> ComicResult<Self> {
        Arc::make_mut(&mut self.db)
            .load_font_file(path)
            .with_context(|| format!("load font file '{}'", path.display()))?;
        Ok(self)
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn fontdb(&self) -> Arc<fontdb::Database> {
        self.db.clone()
    }

    /// Pick a caption font: the preferred families first, then any sans-serif face.
    ///
    /// Only faces at collection index 0 are considered so that text layout and glyph
    /// rasterization agree on the face.
    pub fn caption_font(&self) -> Option<CaptionFont> {
        let mut families: Vec<fontdb::Family<'_>> = PREFERRED_CAPTION_FAMILIES
            .iter()
            .map(|name| fontdb::Family::Name(name))
            .collect();
        families.push(fontdb::Family::SansSerif);

        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };

        let queried = self
            .db
            .query(&query)
            .filter(|id| self.db.face(*id).is_some_and(|face| face.index == 0));
        let id = queried.or_else(|| {
            self.db
                .faces()
                .find(|face| face.index == 0)
                .map(|face| face.id)
        })?;

        let bytes = self.db.with_face_data(id, |data, _index| data.to_vec())?;
        match CaptionFont::from_bytes(bytes) {
            Ok(font) => Some(font),
            Err(e) => {
                tracing::warn!(error = %e, "system caption font could not be loaded");
                None
            }
        }
    }
}

/// First preferred caption family present in `db`, else the first family of any face.
fn preferred_family(db: &fontdb::Database) -> Option<String> {
    let has_family =
        |name: &str| db.faces().any(|face| face.families.iter().any(|(f, _)| f == name));
    PREFERRED_CAPTION_FAMILIES
        .iter()
        .find(|&&name| has_family(name))
        .map(|&name| name.to_string())
        .or_else(|| {
            db.faces()
                .find_map(|face| face.families.first().map(|(f, _)| f.clone()))
        })
}

/// SVG font resolver that never gives up while the database has a face.
///
/// Requested families are tried first, then the generic sans-serif, serif and monospace
/// families, then any face at all.
pub(crate) fn svg_font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, db| {
            let mut families = Vec::<fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => fontdb::Family::Name(s),
                });
            }
            families.push(fontdb::Family::SansSerif);
            families.push(fontdb::Family::Serif);
            families.push(fontdb::Family::Monospace);

            let style = match font.style() {
                usvg::FontStyle::Normal => fontdb::Style::Normal,
                usvg::FontStyle::Italic => fontdb::Style::Italic,
                usvg::FontStyle::Oblique => fontdb::Style::Oblique,
            };
            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: fontdb::Stretch::Normal,
                style,
            };

            db.query(&query).or_else(|| db.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
