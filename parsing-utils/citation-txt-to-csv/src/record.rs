use crate::splitter::PublicationBlock;

/// Column names written as the header row of every output file.
pub const HEADERS: [&str; 11] = [
    "Authors", "Title", "Journal", "Volume", "Year", "num", "ISSN", "link1", "link2", "Abstract",
    "Keywords",
];

/// Number of leading block lines mapped positionally onto the fixed fields.
pub const FIXED_FIELD_COUNT: usize = 9;

/// Blocks shorter than this skip the abstract/keyword split.
pub const MIN_FULL_BLOCK_LEN: usize = FIXED_FIELD_COUNT + 1;

/// One publication mapped onto the output schema.
///
/// Fixed fields are `None` when the source block was too short to reach them.
/// `abstract_text` and `keywords` are `None` for every block that fell back to the
/// short-block path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRecord {
    pub authors: Option<String>,
    pub title: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub year: Option<String>,
    pub num: Option<String>,
    pub issn: Option<String>,
    pub link1: Option<String>,
    pub link2: Option<String>,
    /// Every line between the fixed fields and the last line, joined with `_`.
    pub abstract_text: Option<String>,
    pub keywords: Option<String>,
}

impl OutputRecord {
    /// Maps a publication block onto the schema.
    ///
    /// A block of 10 or more lines fills the 9 fixed fields, merges the middle lines
    /// into the abstract and takes its last line as keywords (with `"& "` restored
    /// to `", "`). A shorter block fills the fixed fields it can reach and nothing else.
    pub fn from_block(block: PublicationBlock) -> Self {
        let mut lines = block.into_iter();
        let mut record = OutputRecord::default();

        let total = lines.len();
        for (slot, line) in record
            .fixed_fields_mut()
            .into_iter()
            .zip(lines.by_ref().take(FIXED_FIELD_COUNT))
        {
            *slot = Some(line);
        }

        if total >= MIN_FULL_BLOCK_LEN {
            let mut tail: Vec<String> = lines.collect();
            let keywords = tail.pop().unwrap_or_default();
            record.abstract_text = Some(tail.join("_"));
            record.keywords = Some(keywords.replace("& ", ", "));
        }

        record
    }

    fn fixed_fields_mut(&mut self) -> [&mut Option<String>; FIXED_FIELD_COUNT] {
        [
            &mut self.authors,
            &mut self.title,
            &mut self.journal,
            &mut self.volume,
            &mut self.year,
            &mut self.num,
            &mut self.issn,
            &mut self.link1,
            &mut self.link2,
        ]
    }

    /// The record as an 11-column row; absent fields are written as empty strings.
    pub fn as_row(&self) -> [&str; 11] {
        [
            &self.authors,
            &self.title,
            &self.journal,
            &self.volume,
            &self.year,
            &self.num,
            &self.issn,
            &self.link1,
            &self.link2,
            &self.abstract_text,
            &self.keywords,
        ]
        .map(|field| field.as_deref().unwrap_or(""))
    }

    /// Number of fields holding a value.
    pub fn populated_fields(&self) -> usize {
        [
            &self.authors,
            &self.title,
            &self.journal,
            &self.volume,
            &self.year,
            &self.num,
            &self.issn,
            &self.link1,
            &self.link2,
            &self.abstract_text,
            &self.keywords,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }
}
