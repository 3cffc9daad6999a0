/// One publication: the cleaned, non-blank lines found between blank-line separators.
pub type PublicationBlock = Vec<String>;

/// Cleans a single non-blank input line.
///
/// Trailing whitespace and one trailing comma are removed, then every `;` becomes `&`
/// so spreadsheet tools don't split the value into extra cells.
pub fn clean_line(line: &str) -> String {
    let trimmed = line.trim_end();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
    trimmed.replace(';', "&")
}

/// Lazily groups raw lines into publication blocks.
///
/// Runs of blank lines collapse into a single separator. The block left over when
/// the input runs out is always yielded, even when it is empty.
pub struct BlockSplitter<I> {
    lines: I,
    finished: bool,
}

impl<I> BlockSplitter<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            finished: false,
        }
    }
}

impl<I, S> Iterator for BlockSplitter<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = PublicationBlock;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut current_block = PublicationBlock::new();
        for line in self.lines.by_ref() {
            let line = line.as_ref();
            if !line.is_empty() {
                current_block.push(clean_line(line));
            } else if !current_block.is_empty() {
                return Some(current_block);
            }
        }

        self.finished = true;
        Some(current_block)
    }
}

/// Splits `lines` (without their terminators) into publication blocks.
pub fn split_blocks<I, S>(lines: I) -> BlockSplitter<I::IntoIter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    BlockSplitter::new(lines.into_iter())
}
