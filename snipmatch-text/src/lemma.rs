//! Rule-based English lemmatizer.
//!
//! A lemma is computed by looking the word up in a small table of irregular forms and
//! otherwise stripping inflectional suffixes (`-s`, `-es`, `-ies`, `-ed`, `-ing`). Rules
//! are re-applied until the word stops changing, so `lemmatize(lemmatize(w)) == lemmatize(w)`.
//! Words in the domain keyword allowlist are never reduced (`pandas` stays `pandas`).

use crate::vocab::is_domain_keyword;

/// Irregular forms and common verbs whose base form the suffix rules cannot recover.
///
/// Every value must itself be a fixed point of [`lemmatize`].
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("am", "be"),
    ("are", "be"),
    ("is", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("doing", "do"),
    ("went", "go"),
    ("gone", "go"),
    ("goes", "go"),
    ("made", "make"),
    ("making", "make"),
    ("used", "use"),
    ("using", "use"),
    ("created", "create"),
    ("creating", "create"),
    ("removed", "remove"),
    ("removing", "remove"),
    ("replaced", "replace"),
    ("replacing", "replace"),
    ("merged", "merge"),
    ("merging", "merge"),
    ("combined", "combine"),
    ("combining", "combine"),
    ("computed", "compute"),
    ("computing", "compute"),
    ("encoded", "encode"),
    ("encoding", "encode"),
    ("saved", "save"),
    ("saving", "save"),
    ("valued", "value"),
    ("writing", "write"),
    ("wrote", "write"),
    ("written", "write"),
    ("reading", "read"),
    ("took", "take"),
    ("taken", "take"),
    ("taking", "take"),
    ("gave", "give"),
    ("given", "give"),
    ("giving", "give"),
    ("got", "get"),
    ("getting", "get"),
    ("built", "build"),
    ("found", "find"),
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("analyses", "analysis"),
    ("axes", "axis"),
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
];

/// Words ending in `s` that are already singular.
const UNINFLECTED: &[&str] = &[
    "alias", "atlas", "bias", "canvas", "corpus", "gas", "lens", "news", "species", "status",
];

fn irregular(word: &str) -> Option<&'static str> {
    IRREGULAR_FORMS
        .iter()
        .find(|(form, _)| *form == word)
        .map(|(_, lemma)| *lemma)
}

fn is_uninflected(word: &str) -> bool {
    UNINFLECTED.contains(&word) || word.ends_with("ias")
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| is_vowel(c) || c == 'y')
}

/// `dropp` -> `drop`, `fitt` -> `fit`, but `fill`, `pass` and `buzz` keep their pair.
fn undouble(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n >= 4 {
        let last = chars[n - 1];
        if last == chars[n - 2] && !is_vowel(last) && !matches!(last, 'l' | 's' | 'z') {
            return chars[..n - 1].iter().collect();
        }
    }
    stem.to_string()
}

/// Whether a stem left by `-ed`/`-ing` lost a silent `e`.
///
/// Covers `-ate` after a consonant or `i`/`u` (`aggregat`, `initiat`, `evaluat`), `-ize`,
/// `-yze` and consonant + `le` (`enabl`, `sampl`, `handl`). `treat` and `repeat` stay as they are.
fn lost_silent_e(stem: &str) -> bool {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n < 3 {
        return false;
    }
    match (chars[n - 3], chars[n - 2], chars[n - 1]) {
        (before, 'a', 't') => !matches!(before, 'a' | 'e' | 'o'),
        (_, 'i' | 'y', 'z') => true,
        (_, consonant, 'l') => !is_vowel(consonant) && !matches!(consonant, 'l' | 'r' | 'w' | 'y'),
        _ => false,
    }
}

/// Turns what is left after stripping `-ed`/`-ing` back into a base form.
fn restore_stem(stem: &str) -> String {
    let with_e = format!("{stem}e");
    if is_domain_keyword(&with_e) {
        return with_e;
    }
    let undoubled = undouble(stem);
    if undoubled != stem {
        return undoubled;
    }
    if lost_silent_e(stem) {
        return with_e;
    }
    stem.to_string()
}

/// One reduction step, or `None` when no rule applies.
fn reduce(word: &str) -> Option<String> {
    if let Some(lemma) = irregular(word) {
        return Some(lemma.to_string());
    }
    if word.len() < 4 || !word.chars().all(|c| c.is_ascii_alphabetic()) || is_uninflected(word) {
        return None;
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return Some(format!("{stem}y"));
        }
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return Some(format!("{stem}ss"));
    }
    if let Some(stem) = word.strip_suffix("es") {
        if stem.ends_with('s') && is_uninflected(stem) {
            return Some(stem.to_string());
        }
    }
    for suffix in ["xes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return Some(word[..word.len() - 2].to_string());
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && !word.ends_with("is")
    {
        return Some(word[..word.len() - 1].to_string());
    }
    if let Some(stem) = word.strip_suffix("ing") {
        if stem.len() >= 3 && has_vowel(stem) {
            return Some(restore_stem(stem));
        }
    }
    if let Some(stem) = word.strip_suffix("ed") {
        if stem.len() >= 3 && has_vowel(stem) && !word.ends_with("eed") {
            return Some(restore_stem(stem));
        }
    }
    None
}

/// Returns the lower-cased base form of `token`.
///
/// Tokens that are not purely alphabetic (numbers, identifiers such as `f1` or `read_csv`)
/// are returned lower-cased but otherwise unchanged.
pub fn lemmatize(token: &str) -> String {
    let mut current = token.to_lowercase();
    loop {
        if is_domain_keyword(&current) {
            return current;
        }
        match reduce(&current) {
            Some(next) if next != current => current = next,
            _ => return current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemmatize("columns"), "column");
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("matches"), "match");
        assert_eq!(lemmatize("values"), "value");
        assert_eq!(lemmatize("features"), "feature");
        assert_eq!(lemmatize("bias"), "bias");
        assert_eq!(lemmatize("biases"), "bias");
        assert_eq!(lemmatize("aliases"), "alias");
        assert_eq!(lemmatize("species"), "species");
        assert_eq!(lemmatize("lens"), "lens");
        assert_eq!(lemmatize("lenses"), "lens");
        assert_eq!(lemmatize("statuses"), "status");
        assert_eq!(lemmatize("ideas"), "idea");
        assert_eq!(lemmatize("databases"), "database");
    }

    #[test]
    fn test_verb_forms() {
        assert_eq!(lemmatize("dropping"), "drop");
        assert_eq!(lemmatize("dropped"), "drop");
        assert_eq!(lemmatize("filled"), "fill");
        assert_eq!(lemmatize("filling"), "fill");
        assert_eq!(lemmatize("grouped"), "group");
        assert_eq!(lemmatize("Sorting"), "sort");
        assert_eq!(lemmatize("removes"), "remove");
        assert_eq!(lemmatize("was"), "be");
        assert_eq!(lemmatize("summed"), "sum");
        assert_eq!(lemmatize("formatting"), "format");
        assert_eq!(lemmatize("treated"), "treat");
    }

    #[test]
    fn test_silent_e_is_restored() {
        assert_eq!(lemmatize("normalized"), "normalize");
        assert_eq!(lemmatize("normalizing"), "normalize");
        assert_eq!(lemmatize("standardized"), "standardize");
        assert_eq!(lemmatize("scaled"), "scale");
        assert_eq!(lemmatize("scaling"), "scale");
        assert_eq!(lemmatize("visualizing"), "visualize");
        assert_eq!(lemmatize("sampled"), "sample");
        assert_eq!(lemmatize("handling"), "handle");
        assert_eq!(lemmatize("enabled"), "enable");
        assert_eq!(lemmatize("aggregated"), "aggregate");
        assert_eq!(lemmatize("evaluating"), "evaluate");
        assert_eq!(lemmatize("duplicated"), "duplicate");
        assert_eq!(lemmatize("sized"), "size");
    }

    #[test]
    fn test_keywords_are_their_own_lemma() {
        assert_eq!(lemmatize("pandas"), "pandas");
        assert_eq!(lemmatize("series"), "series");
        assert_eq!(lemmatize("training"), "training");
        assert_eq!(lemmatize("analysis"), "analysis");
        assert_eq!(lemmatize("predictions"), "prediction");
    }

    #[test]
    fn test_short_and_non_alphabetic_tokens() {
        assert_eq!(lemmatize("is"), "be");
        assert_eq!(lemmatize("bus"), "bus");
        assert_eq!(lemmatize("read_csv"), "read_csv");
        assert_eq!(lemmatize("1.5"), "1.5");
        assert_eq!(lemmatize("f1"), "f1");
        assert_eq!(lemmatize("need"), "need");
        assert_eq!(lemmatize("added"), "add");
    }

    #[test]
    fn test_irregular_values_are_fixed_points() {
        for (form, lemma) in IRREGULAR_FORMS {
            assert_eq!(
                lemmatize(lemma),
                *lemma,
                "lemma of {form} is not a fixed point"
            );
        }
    }

    #[test]
    fn test_lemmatize_is_idempotent_on_samples() {
        for word in [
            "dropping", "values", "indices", "columns", "aggregated", "merging", "plotting",
            "histograms", "missing", "classes", "studies", "summed", "normalized", "scaling",
            "sampled", "biases", "species", "handling", "updated",
        ] {
            let once = lemmatize(word);
            assert_eq!(lemmatize(&once), once, "{word}");
        }
    }
}
