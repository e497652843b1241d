//! Format classification.
//!
//! A record's display format is decided in priority order:
//!
//! 1. the physical description (`007`, when at least six characters long)
//! 2. leader type of record and bibliographic level, refined by `008`
//! 3. `006`, for manuscripts and electronic resources
//! 4. otherwise [`FormatLabel::Unknown`]
//!
//! A location override is applied last and wins over all of the above:
//! reference shelving makes a record a book and periodicals shelving makes
//! it a journal. Every positional read is bounds-checked; a control field
//! that is missing or too short simply gives no signal.

use crate::record::Record;
use crate::tables::{LocationRules, LocationTable, LookupTables};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, warn};

/// Minimum `007` length for the physical description to be used.
const MIN_007_LEN: usize = 6;

/// The closed format vocabulary.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatLabel {
    Atlas,
    Map,
    FloppyDisk,
    Electronic,
    Cdrom,
    Globe,
    Microfilm,
    Collage,
    Drawing,
    Painting,
    Print,
    Photonegative,
    FlashCard,
    Chart,
    Photo,
    Videocassette,
    Filmstrip,
    MotionPicture,
    Kit,
    MusicalScore,
    BookOnCassette,
    BookOnCd,
    Cassette,
    MusicCd,
    LpRecord,
    DvdVideo,
    BluRayVideo,
    VhsVideo,
    VideoReel,
    Series,
    Collection,
    LargePrintBook,
    Book,
    Journal,
    Manuscript,
    Video,
    ManuscriptNotedMusic,
    MusicSoundRecordings,
    SpokenSoundRecordings,
    Poster,
    FlashCards,
    Charts,
    MixedMaterials,
    Games,
    Thesis,
    Unknown,
}

impl FormatLabel {
    /// Display string stored in the `format` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FormatLabel::Atlas => "Atlas",
            FormatLabel::Map => "Map",
            FormatLabel::FloppyDisk => "Floppy Disk",
            FormatLabel::Electronic => "Electronic",
            FormatLabel::Cdrom => "CDROM",
            FormatLabel::Globe => "Globe",
            FormatLabel::Microfilm => "Microfilm",
            FormatLabel::Collage => "Collage",
            FormatLabel::Drawing => "Drawing",
            FormatLabel::Painting => "Painting",
            FormatLabel::Print => "Print",
            FormatLabel::Photonegative => "Photonegative",
            FormatLabel::FlashCard => "Flash Card",
            FormatLabel::Chart => "Chart",
            FormatLabel::Photo => "Photo",
            FormatLabel::Videocassette => "Videocassette",
            FormatLabel::Filmstrip => "Filmstrip",
            FormatLabel::MotionPicture => "Motion picture",
            FormatLabel::Kit => "Kit",
            FormatLabel::MusicalScore => "Musical Score",
            FormatLabel::BookOnCassette => "Book On Cassette",
            FormatLabel::BookOnCd => "Book On CD",
            FormatLabel::Cassette => "Cassette",
            FormatLabel::MusicCd => "Music CD",
            FormatLabel::LpRecord => "LP Record",
            FormatLabel::DvdVideo => "DVD Video",
            FormatLabel::BluRayVideo => "Blu-ray Video",
            FormatLabel::VhsVideo => "VHS Video",
            FormatLabel::VideoReel => "Video Reel",
            FormatLabel::Series => "Series",
            FormatLabel::Collection => "Collection",
            FormatLabel::LargePrintBook => "Large Print Book",
            FormatLabel::Book => "Book",
            FormatLabel::Journal => "Journal",
            FormatLabel::Manuscript => "Manuscript",
            FormatLabel::Video => "Video",
            FormatLabel::ManuscriptNotedMusic => "Manuscript noted music",
            FormatLabel::MusicSoundRecordings => "Music Sound Recordings",
            FormatLabel::SpokenSoundRecordings => "Spoken Sound Recordings",
            FormatLabel::Poster => "Poster",
            FormatLabel::FlashCards => "Flash Cards",
            FormatLabel::Charts => "Charts",
            FormatLabel::MixedMaterials => "Mixed Materials",
            FormatLabel::Games => "Games",
            FormatLabel::Thesis => "Thesis",
            FormatLabel::Unknown => "Unknown",
        }
    }
}

impl Serialize for FormatLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for FormatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assigns a [`FormatLabel`] to a record.
#[derive(Debug, Clone, Copy)]
pub struct FormatClassifier<'a> {
    rules: &'a LocationRules,
}

impl<'a> FormatClassifier<'a> {
    /// Classifier using the location rules of `tables`.
    #[must_use]
    pub fn new(tables: &'a LookupTables) -> Self {
        FormatClassifier {
            rules: &tables.location_rules,
        }
    }

    /// Classify a record. Always returns a label.
    #[must_use]
    pub fn classify(&self, record: &Record) -> FormatLabel {
        let label = physical_description(record)
            .or_else(|| leader_and_008(record))
            .or_else(|| from_006(record))
            .unwrap_or_else(|| {
                debug!(
                    id = record.get_control_field("001").unwrap_or(""),
                    leader = %record.leader,
                    "no format rule matched"
                );
                FormatLabel::Unknown
            });
        self.location_override(record).unwrap_or(label)
    }

    /// Format forced by the record's shelving location, if any.
    ///
    /// The first `994$a` code that is reference shelving (other than the
    /// excluded reference code) yields [`FormatLabel::Book`]; the first that
    /// is periodicals shelving yields [`FormatLabel::Journal`].
    #[must_use]
    pub fn location_override(&self, record: &Record) -> Option<FormatLabel> {
        record.subfield_values("994", 'a').find_map(|raw| {
            let code = LocationTable::clean_code(raw);
            if self.rules.is_reference(&code) {
                Some(FormatLabel::Book)
            } else if self.rules.is_periodicals(&code) {
                Some(FormatLabel::Journal)
            } else {
                None
            }
        })
    }
}

/// Format from the `007` physical description.
#[must_use]
pub fn physical_description(record: &Record) -> Option<FormatLabel> {
    let f007: Vec<char> = record.get_control_field("007")?.chars().collect();
    if f007.len() < MIN_007_LEN {
        return None;
    }
    let at = |pos: usize| f007.get(pos).copied();

    match f007[0] {
        'a' if at(1) == Some('d') => Some(FormatLabel::Atlas),
        'a' => Some(FormatLabel::Map),
        'c' => match at(1) {
            Some('j') => Some(FormatLabel::FloppyDisk),
            Some('r') => Some(FormatLabel::Electronic),
            Some('o' | 'm') => Some(FormatLabel::Cdrom),
            _ => None,
        },
        'd' => Some(FormatLabel::Globe),
        'h' => Some(FormatLabel::Microfilm),
        'k' => Some(match at(1) {
            Some('c') => FormatLabel::Collage,
            Some('d' | 'l') => FormatLabel::Drawing,
            Some('e') => FormatLabel::Painting,
            Some('f' | 'j') => FormatLabel::Print,
            Some('g') => FormatLabel::Photonegative,
            Some('o') => FormatLabel::FlashCard,
            Some('n') => FormatLabel::Chart,
            _ => FormatLabel::Photo,
        }),
        'm' => Some(match at(1) {
            Some('f') => FormatLabel::Videocassette,
            Some('r') => FormatLabel::Filmstrip,
            _ => FormatLabel::MotionPicture,
        }),
        'o' => Some(FormatLabel::Kit),
        'q' => Some(FormatLabel::MusicalScore),
        's' => sound_recording(record.leader.record_type, at(1), at(6)),
        'v' => match at(1) {
            Some('d') => match at(4) {
                Some('v' | 'g') => Some(FormatLabel::DvdVideo),
                Some('s') => Some(FormatLabel::BluRayVideo),
                Some('b') => Some(FormatLabel::VhsVideo),
                other => {
                    warn!(
                        id = record.get_control_field("001").unwrap_or(""),
                        videodisc_format = ?other,
                        "unrecognised videodisc format in 007/04"
                    );
                    None
                },
            },
            Some('f') => Some(FormatLabel::VhsVideo),
            Some('r') => Some(FormatLabel::VideoReel),
            _ => None,
        },
        _ => None,
    }
}

/// Sound recordings split on leader/06: `i` spoken, `j` musical.
fn sound_recording(
    record_type: char,
    material: Option<char>,
    dimensions: Option<char>,
) -> Option<FormatLabel> {
    let compact_disc = matches!(dimensions, Some('g' | 'z'));
    match (record_type, material) {
        ('i', Some('s')) => Some(FormatLabel::BookOnCassette),
        ('i', Some('d')) if compact_disc => Some(FormatLabel::BookOnCd),
        ('j', Some('s')) => Some(FormatLabel::Cassette),
        ('j', Some('d')) if compact_disc => Some(FormatLabel::MusicCd),
        ('j', Some('d')) if dimensions == Some('e') => Some(FormatLabel::LpRecord),
        _ => None,
    }
}

/// Format from leader/06-07 and `008`.
#[must_use]
pub fn leader_and_008(record: &Record) -> Option<FormatLabel> {
    let f008: Vec<char> = record
        .get_control_field("008")
        .map(|v| v.chars().collect())
        .unwrap_or_default();
    let at = |pos: usize| f008.get(pos).copied();
    let level = record.leader.bibliographic_level;

    match record.leader.record_type {
        'a' => match level {
            'a' => Some(FormatLabel::Series),
            'c' => Some(FormatLabel::Collection),
            'm' => Some(match at(23) {
                Some('d') => FormatLabel::LargePrintBook,
                Some('s') => FormatLabel::Electronic,
                _ => FormatLabel::Book,
            }),
            's' => Some(serial(at(21))),
            _ => None,
        },
        'b' => Some(FormatLabel::Manuscript),
        'c' => Some(FormatLabel::MusicalScore),
        'd' => Some(FormatLabel::ManuscriptNotedMusic),
        'e' => Some(FormatLabel::Map),
        'g' => Some(FormatLabel::Video),
        'i' if level != '#' => Some(FormatLabel::SpokenSoundRecordings),
        'j' => Some(FormatLabel::MusicSoundRecordings),
        'k' => match at(33) {
            Some('i') => Some(FormatLabel::Poster),
            Some('o') => Some(FormatLabel::FlashCards),
            Some('n') => Some(FormatLabel::Charts),
            _ => None,
        },
        'm' => Some(FormatLabel::Electronic),
        'o' if at(33) == Some('b') => Some(FormatLabel::Kit),
        'p' if level == 'c' => Some(FormatLabel::Collection),
        'p' => Some(FormatLabel::MixedMaterials),
        'r' if at(33) == Some('g') => Some(FormatLabel::Games),
        't' => Some(manuscript_language_material(record, at(24), f008.len())),
        _ => None,
    }
}

/// Serials by 008/21 frequency: monthly (`m`) runs are shelved and
/// displayed as books, every other frequency as a journal.
fn serial(frequency: Option<char>) -> FormatLabel {
    if frequency == Some('m') {
        FormatLabel::Book
    } else {
        FormatLabel::Journal
    }
}

/// Theses and manuscripts (leader/06 `t`), using 008/24 or a `502` note.
fn manuscript_language_material(record: &Record, contents: Option<char>, len_008: usize) -> FormatLabel {
    if len_008 <= 22 {
        return FormatLabel::Manuscript;
    }
    match contents {
        Some('m') => FormatLabel::Thesis,
        Some('b') => FormatLabel::Book,
        _ if record.fields_by_tag("502").any(|f| f.value().contains("Thesis")) => {
            FormatLabel::Thesis
        },
        _ => FormatLabel::Manuscript,
    }
}

/// Format from the `006` additional material characteristics.
#[must_use]
pub fn from_006(record: &Record) -> Option<FormatLabel> {
    match (record.control_char("006", 0), record.control_char("006", 6)) {
        (Some('t'), _) => Some(FormatLabel::Manuscript),
        (Some('m'), _) | (_, Some('o')) => Some(FormatLabel::Electronic),
        _ => None,
    }
}
