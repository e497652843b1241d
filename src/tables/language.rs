use std::collections::HashMap;

/// MARC language codes (008/35-37 and `041`).
const CODES: &[(&str, &str)] = &[
    ("afr", "Afrikaans"),
    ("akk", "Akkadian"),
    ("alb", "Albanian"),
    ("amh", "Amharic"),
    ("ang", "English, Old (ca. 450-1100)"),
    ("ara", "Arabic"),
    ("arc", "Aramaic"),
    ("arm", "Armenian"),
    ("aze", "Azerbaijani"),
    ("baq", "Basque"),
    ("bel", "Belarusian"),
    ("ben", "Bengali"),
    ("bos", "Bosnian"),
    ("bre", "Breton"),
    ("bul", "Bulgarian"),
    ("bur", "Burmese"),
    ("cat", "Catalan"),
    ("chi", "Chinese"),
    ("chr", "Cherokee"),
    ("cop", "Coptic"),
    ("cre", "Cree"),
    ("cze", "Czech"),
    ("dak", "Dakota"),
    ("dan", "Danish"),
    ("dut", "Dutch"),
    ("egy", "Egyptian"),
    ("eng", "English"),
    ("enm", "English, Middle (1100-1500)"),
    ("epo", "Esperanto"),
    ("est", "Estonian"),
    ("fao", "Faroese"),
    ("fin", "Finnish"),
    ("fre", "French"),
    ("frm", "French, Middle (ca. 1300-1600)"),
    ("fro", "French, Old (ca. 842-1300)"),
    ("fry", "Frisian"),
    ("gae", "Scottish Gaelic"),
    ("geo", "Georgian"),
    ("ger", "German"),
    ("gla", "Scottish Gaelic"),
    ("gle", "Irish"),
    ("gmh", "German, Middle High (ca. 1050-1500)"),
    ("goh", "German, Old High (ca. 750-1050)"),
    ("got", "Gothic"),
    ("grc", "Greek, Ancient (to 1453)"),
    ("gre", "Greek, Modern (1453- )"),
    ("grn", "Guarani"),
    ("guj", "Gujarati"),
    ("hat", "Haitian French Creole"),
    ("haw", "Hawaiian"),
    ("heb", "Hebrew"),
    ("hin", "Hindi"),
    ("hmn", "Hmong"),
    ("hun", "Hungarian"),
    ("ice", "Icelandic"),
    ("ind", "Indonesian"),
    ("ira", "Iranian (Other)"),
    ("iri", "Irish"),
    ("ita", "Italian"),
    ("jpn", "Japanese"),
    ("kaz", "Kazakh"),
    ("khm", "Khmer"),
    ("kin", "Kinyarwanda"),
    ("kor", "Korean"),
    ("kur", "Kurdish"),
    ("lad", "Ladino"),
    ("lao", "Lao"),
    ("lat", "Latin"),
    ("lav", "Latvian"),
    ("lit", "Lithuanian"),
    ("ltz", "Luxembourgish"),
    ("mac", "Macedonian"),
    ("mal", "Malayalam"),
    ("mao", "Maori"),
    ("mar", "Marathi"),
    ("may", "Malay"),
    ("mlt", "Maltese"),
    ("mon", "Mongolian"),
    ("mul", "Multiple languages"),
    ("nah", "Nahuatl"),
    ("nav", "Navajo"),
    ("nep", "Nepali"),
    ("non", "Old Norse"),
    ("nor", "Norwegian"),
    ("oji", "Ojibwa"),
    ("pan", "Panjabi"),
    ("per", "Persian"),
    ("pli", "Pali"),
    ("pol", "Polish"),
    ("por", "Portuguese"),
    ("pro", "Provencal (to 1500)"),
    ("pus", "Pushto"),
    ("que", "Quechua"),
    ("roh", "Raeto-Romance"),
    ("rom", "Romani"),
    ("rum", "Romanian"),
    ("rus", "Russian"),
    ("san", "Sanskrit"),
    ("scc", "Serbian"),
    ("scr", "Croatian"),
    ("sgn", "Sign languages"),
    ("slo", "Slovak"),
    ("slv", "Slovenian"),
    ("sma", "Southern Sami"),
    ("som", "Somali"),
    ("spa", "Spanish"),
    ("srp", "Serbian"),
    ("swa", "Swahili"),
    ("swe", "Swedish"),
    ("syr", "Syriac, Modern"),
    ("tag", "Tagalog"),
    ("tam", "Tamil"),
    ("tat", "Tatar"),
    ("tel", "Telugu"),
    ("tgl", "Tagalog"),
    ("tha", "Thai"),
    ("tib", "Tibetan"),
    ("tur", "Turkish"),
    ("ukr", "Ukrainian"),
    ("und", "Undetermined"),
    ("urd", "Urdu"),
    ("uzb", "Uzbek"),
    ("vie", "Vietnamese"),
    ("wel", "Welsh"),
    ("yid", "Yiddish"),
    ("yor", "Yoruba"),
    ("zul", "Zulu"),
    ("zxx", "No linguistic content"),
];

pub(super) fn builtin() -> HashMap<String, String> {
    CODES
        .iter()
        .map(|(code, name)| ((*code).to_string(), (*name).to_string()))
        .collect()
}
