use std::collections::HashMap;

/// Target audience codes (008/22 for books, music and visual materials).
pub(super) fn builtin() -> HashMap<char, String> {
    [
        ('a', "Preschool"),
        ('b', "Primary"),
        ('c', "Pre-adolescent"),
        ('d', "Adolescent"),
        ('e', "Adult"),
        ('f', "Specialized"),
        ('g', "General"),
        ('j', "Juvenile"),
    ]
    .into_iter()
    .map(|(code, name)| (code, name.to_string()))
    .collect()
}
