use std::collections::HashMap;

/// Library of Congress classification main classes.
///
/// Keys are single letters; subclass runs such as `QA` resolve through
/// their first letter unless an override adds them.
pub(super) fn builtin() -> HashMap<String, String> {
    [
        ("A", "General Works"),
        ("B", "Philosophy, Psychology, Religion"),
        ("C", "Auxiliary Sciences of History"),
        ("D", "World History"),
        ("E", "History of the Americas"),
        ("F", "History of the Americas"),
        ("G", "Geography, Anthropology, Recreation"),
        ("H", "Social Sciences"),
        ("J", "Political Science"),
        ("K", "Law"),
        ("L", "Education"),
        ("M", "Music"),
        ("N", "Fine Arts"),
        ("P", "Language and Literature"),
        ("Q", "Science"),
        ("R", "Medicine"),
        ("S", "Agriculture"),
        ("T", "Technology"),
        ("U", "Military Science"),
        ("V", "Naval Science"),
        ("Z", "Bibliography, Library Science"),
    ]
    .into_iter()
    .map(|(letter, name)| (letter.to_string(), format!("{letter} - {name}")))
    .collect()
}
