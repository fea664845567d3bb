use super::*;
use crate::{Point, Stroke};

fn lib_with_variants(n: usize) -> GlyphLibrary {
    let mut lib = GlyphLibrary::new("ada");
    for i in 0..n {
        let x = i as f64;
        let s = Stroke::new([Point::new(x, 0.0), Point::new(x + 1.0, 100.0)]).unwrap();
        lib.insert(GlyphSample::new('e', vec![s]).unwrap());
    }
    lib
}

#[test]
fn missing_character_is_missing_glyph() {
    let lib = lib_with_variants(1);
    let mut sel = GlyphSelector::new(&lib, 1);
    assert!(matches!(
        sel.select('q', 0),
        Err(PenwrightError::MissingGlyph { character: 'q' })
    ));
}

#[test]
fn single_variant_is_always_chosen() {
    let lib = lib_with_variants(1);
    let mut sel = GlyphSelector::new(&lib, 5);
    for i in 0..10 {
        assert_eq!(sel.select('e', i).unwrap().variant, 0);
    }
}

#[test]
fn selection_is_reproducible_for_a_seed() {
    let lib = lib_with_variants(4);
    let run = |seed| {
        let mut sel = GlyphSelector::new(&lib, seed);
        (0..32)
            .map(|i| sel.select('e', i).unwrap().variant)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}

#[test]
fn consecutive_occurrences_do_not_repeat_a_variant() {
    let lib = lib_with_variants(2);
    let mut sel = GlyphSelector::new(&lib, 3);
    let picks: Vec<usize> = (0..20).map(|i| sel.select('e', i).unwrap().variant).collect();
    for w in picks.windows(2) {
        assert_ne!(w[0], w[1]);
    }
}

#[test]
fn selected_sample_belongs_to_the_variant_list() {
    let lib = lib_with_variants(3);
    let mut sel = GlyphSelector::new(&lib, 8);
    let s = sel.select('e', 4).unwrap();
    assert!(std::ptr::eq(s.sample, &lib.get('e')[s.variant]));
}
