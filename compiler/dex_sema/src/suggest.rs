//! "Did you mean?" suggestions for undefined identifiers and members.

use dex_ir::{AggId, Name, Program};

use crate::scope::ScopeChain;

/// Suggest a visible name close to `unknown`: locals, enclosing members and
/// module-level symbols.
pub fn suggest_identifier(program: &Program, scope: &ScopeChain, unknown: Name) -> Option<String> {
    let unknown_str = program.text(unknown);
    let candidates = scope
        .visible_names(program)
        .chain(program.globals.keys().copied())
        .map(|name| program.text(name));
    suggest_similar(unknown_str, candidates)
}

/// Suggest a field or method of `agg` close to `unknown`.
pub fn suggest_member(program: &Program, agg: AggId, unknown: Name) -> Option<String> {
    let decl = program.decls.agg(agg);
    let fields = decl.fields.iter().map(|&f| program.decls.var(f).name);
    let methods = decl.methods.iter().map(|&f| program.decls.func(f).name);
    let candidates = fields.chain(methods).map(|name| program.text(name));
    suggest_similar(program.text(unknown), candidates)
}

/// Levenshtein distance over chars, two rows at a time.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.chars().enumerate() {
            let cost = usize::from(a_char != b_char);

            curr_row[j + 1] = (prev_row[j + 1] + 1) // deletion
                .min(curr_row[j] + 1) // insertion
                .min(prev_row[j] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

fn default_threshold(name_len: usize) -> usize {
    match name_len {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        6..=10 => 3,
        n => (n / 2).min(5),
    }
}

/// Closest candidate within the length-based threshold. Ties keep the
/// first candidate seen, so callers list the innermost names first.
fn suggest_similar<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    let threshold = default_threshold(name.len());
    let mut best: Option<(&str, usize)> = None;

    for candidate in candidates {
        if name.len().abs_diff(candidate.len()) > threshold || candidate == name {
            continue;
        }
        let distance = edit_distance(name, candidate);
        if distance > threshold {
            continue;
        }
        match best {
            Some((_, best_dist)) if distance >= best_dist => {}
            _ => best = Some((candidate, distance)),
        }
    }

    best.map(|(s, _)| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn distance_counts_single_edits() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn suggests_the_closest_name() {
        let names = ["width", "length", "height"];
        assert_eq!(
            suggest_similar("lenght", names.iter().copied()),
            Some("length".to_string())
        );
    }

    #[test]
    fn far_names_are_not_suggested() {
        assert_eq!(suggest_similar("x", ["counter"].iter().copied()), None);
        assert_eq!(suggest_similar("", ["a"].iter().copied()), None);
    }
}
