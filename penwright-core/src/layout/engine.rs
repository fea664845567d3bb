use crate::{
    foundation::{
        core::Point,
        error::{PenwrightError, PenwrightResult},
        math::{Rng64, sub_seed},
    },
    layout::{
        page::{LayoutGlyph, MissingGlyphPolicy, Page, PageConfig, Substitution, WrapMode},
        selector::{GlyphSelector, Selection},
    },
    library::glyph::{GlyphLibrary, GlyphSample},
};

/// A glyph resolved and jittered but not yet positioned.
struct Pending<'lib> {
    sample: &'lib GlyphSample,
    character: char,
    variant: usize,
    width: f64,
    advance: f64,
    dx: f64,
    dy: f64,
    rotation_rad: f64,
    scale: f64,
}

enum Token<'lib> {
    Glyph(Pending<'lib>),
    Gap,
}

const LEFT_EDGE_EPS: f64 = 1e-9;

struct Cursor {
    x: f64,
    y: f64,
    line: usize,
}

/// Arrange `text` into a page of placed glyph samples.
///
/// Deterministic for a given `(text, library, config, seed)`.
#[tracing::instrument(skip(text, library, config), fields(user = library.user(), chars = text.chars().count()))]
pub fn layout<'lib>(
    text: &str,
    library: &'lib GlyphLibrary,
    config: &PageConfig,
    seed: u64,
) -> PenwrightResult<Page<'lib>> {
    config.validate()?;

    let mut selector = GlyphSelector::new(library, seed);
    let mut rng = Rng64::new(sub_seed(seed, b"layout"));
    let mut substitutions = Vec::new();

    let mut cursor = Cursor {
        x: config.line_start_x(),
        y: config.margin + config.line_height,
        line: 0,
    };
    let mut glyphs = Vec::new();
    let mut word: Vec<Token<'lib>> = Vec::new();

    for (position, c) in text.chars().enumerate() {
        match c {
            '\n' => {
                flush_word(&mut word, &mut cursor, &mut glyphs, config)?;
                new_line(&mut cursor, config);
            }
            c if c.is_whitespace() => {
                flush_word(&mut word, &mut cursor, &mut glyphs, config)?;
                cursor.x += config.space_width;
            }
            c if c.is_control() => {}
            c => {
                let token = match resolve(&mut selector, c, position, config.missing_glyph)? {
                    Some((sel, placeholder)) => {
                        if placeholder.is_some() {
                            substitutions.push(Substitution {
                                position,
                                requested: c,
                                placeholder,
                            });
                        }
                        Token::Glyph(jitter(&mut rng, sel.sample, c, sel.variant, config))
                    }
                    None => {
                        substitutions.push(Substitution {
                            position,
                            requested: c,
                            placeholder: None,
                        });
                        Token::Gap
                    }
                };
                word.push(token);
            }
        }
    }
    flush_word(&mut word, &mut cursor, &mut glyphs, config)?;

    let lines = glyphs
        .iter()
        .map(|g: &LayoutGlyph<'_>| g.line + 1)
        .max()
        .unwrap_or(0);
    tracing::debug!(glyphs = glyphs.len(), lines, "layout complete");

    Ok(Page {
        glyphs,
        width: config.width,
        height: config.height,
        margin: config.margin,
        line_height: config.line_height,
        scale_factor: config.scale_factor,
        lines,
        substitutions,
    })
}

fn resolve<'lib>(
    selector: &mut GlyphSelector<'lib>,
    c: char,
    position: usize,
    policy: MissingGlyphPolicy,
) -> PenwrightResult<Option<(Selection<'lib>, Option<char>)>> {
    match selector.select(c, position) {
        Ok(sel) => Ok(Some((sel, None))),
        Err(PenwrightError::MissingGlyph { .. }) => match policy {
            MissingGlyphPolicy::Abort => Err(PenwrightError::missing_glyph(c)),
            MissingGlyphPolicy::Substitute { character } => {
                let sel = selector
                    .select(character, position)
                    .map_err(|_| PenwrightError::missing_glyph(c))?;
                tracing::warn!(requested = %c, placeholder = %character, position, "substituting missing glyph");
                Ok(Some((sel, Some(character))))
            }
            MissingGlyphPolicy::Skip => {
                tracing::warn!(requested = %c, position, "skipping missing glyph");
                Ok(None)
            }
        },
        Err(e) => Err(e),
    }
}

fn jitter<'lib>(
    rng: &mut Rng64,
    sample: &'lib GlyphSample,
    character: char,
    variant: usize,
    config: &PageConfig,
) -> Pending<'lib> {
    let j = &config.jitter;
    // Fixed draw order keeps runs reproducible.
    let dx = rng.next_symmetric(j.offset_x);
    let dy = rng.next_symmetric(j.offset_y);
    let rotation_rad = rng.next_symmetric(j.rotation_deg).to_radians();
    let scale = 1.0 + rng.next_symmetric(j.scale);
    let spacing = config.char_spacing + rng.next_symmetric(j.spacing);

    let width = sample.width() * config.scale_factor * scale;
    Pending {
        sample,
        character,
        variant,
        width,
        advance: (width + spacing).max(0.0),
        dx,
        dy,
        rotation_rad,
        scale,
    }
}

fn flush_word<'lib>(
    word: &mut Vec<Token<'lib>>,
    cursor: &mut Cursor,
    out: &mut Vec<LayoutGlyph<'lib>>,
    config: &PageConfig,
) -> PenwrightResult<()> {
    if word.is_empty() {
        return Ok(());
    }
    let start = config.line_start_x();
    let limit = config.line_limit_x() - config.jitter.offset_x;

    if config.wrap == WrapMode::Word && cursor.x > start {
        let mut width = 0.0;
        let mut last_glyph_width = 0.0;
        for t in word.iter() {
            match t {
                Token::Glyph(p) => {
                    width += p.advance;
                    last_glyph_width = p.width - p.advance;
                }
                Token::Gap => {
                    width += config.space_width;
                    last_glyph_width = 0.0;
                }
            }
        }
        if cursor.x + width + last_glyph_width > limit {
            new_line(cursor, config);
        }
    }

    for t in word.drain(..) {
        match t {
            Token::Gap => cursor.x += config.space_width,
            Token::Glyph(p) => {
                // A glyph wider than the line stays on its own line.
                if cursor.x > start && cursor.x + p.width > limit {
                    new_line(cursor, config);
                }
                if cursor.y > config.bottom_limit_y() {
                    return Err(PenwrightError::out_of_bounds(format!(
                        "text needs line {} at y={:.2} mm, below page limit {:.2} mm",
                        cursor.line + 1,
                        cursor.y,
                        config.bottom_limit_y()
                    )));
                }
                let mut placed = LayoutGlyph {
                    sample: p.sample,
                    character: p.character,
                    variant: p.variant,
                    origin: Point::new(cursor.x + p.dx, cursor.y + p.dy),
                    rotation_rad: p.rotation_rad,
                    scale: p.scale,
                    line: cursor.line,
                };
                // Jitter must not push ink past the left margin.
                let overhang = start - placed.page_bounds(config.scale_factor).x0;
                if overhang > LEFT_EDGE_EPS {
                    placed.origin.x += overhang;
                }
                out.push(placed);
                cursor.x += p.advance;
            }
        }
    }
    Ok(())
}

fn new_line(cursor: &mut Cursor, config: &PageConfig) {
    cursor.x = config.line_start_x();
    cursor.y += config.line_height;
    cursor.line += 1;
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
