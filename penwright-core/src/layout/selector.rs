use std::collections::HashMap;

use crate::{
    foundation::{
        error::{PenwrightError, PenwrightResult},
        math::{Fnv1a64, Rng64, sub_seed},
    },
    library::glyph::{GlyphLibrary, GlyphSample},
};

/// A concrete variant chosen for one character occurrence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection<'lib> {
    /// Index into the character's variant list.
    pub variant: usize,
    /// The chosen sample.
    pub sample: &'lib GlyphSample,
}

/// Seeded variant picker.
///
/// The draw for an occurrence depends only on `(seed, character, position_index)`, so a
/// fixed seed reproduces the same choices. Consecutive occurrences of a character never
/// repeat the previous variant when an alternative exists.
#[derive(Debug)]
pub struct GlyphSelector<'lib> {
    library: &'lib GlyphLibrary,
    seed: u64,
    last_variant: HashMap<char, usize>,
}

impl<'lib> GlyphSelector<'lib> {
    /// Selector over `library` for one compilation run.
    pub fn new(library: &'lib GlyphLibrary, seed: u64) -> Self {
        Self {
            library,
            seed: sub_seed(seed, b"select"),
            last_variant: HashMap::new(),
        }
    }

    /// Pick a variant for `character` at char index `position_index` of the request.
    pub fn select(
        &mut self,
        character: char,
        position_index: usize,
    ) -> PenwrightResult<Selection<'lib>> {
        let variants = self.library.get(character);
        if variants.is_empty() {
            return Err(PenwrightError::missing_glyph(character));
        }

        let mut h = Fnv1a64::new(self.seed);
        h.write_u64(u64::from(character));
        h.write_u64(position_index as u64);
        let mut rng = Rng64::new(h.finish());

        let n = variants.len();
        let mut variant = rng.next_index(n);
        if n > 1 && self.last_variant.get(&character) == Some(&variant) {
            variant = (variant + 1 + rng.next_index(n - 1)) % n;
        }
        self.last_variant.insert(character, variant);

        Ok(Selection {
            variant,
            sample: &variants[variant],
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/selector.rs"]
mod tests;
