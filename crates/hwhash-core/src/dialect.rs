//! Delimiter detection for CSV exports of unknown origin

/// Number of leading characters inspected when sniffing
pub const SAMPLE_CHARS: usize = 1024;

/// Delimiters tried while sniffing, in tie-break order
pub const CANDIDATE_DELIMITERS: &[u8] = b",\t;|";

/// Delimiter and quoting convention of a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl Dialect {
    /// Build a csv reader over `text` using this dialect
    ///
    /// Headers are never consumed by the reader itself; callers decide
    /// whether the first record is a header.
    pub fn reader<'a>(&self, text: &'a str) -> csv::Reader<&'a [u8]> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .from_reader(text.as_bytes())
    }

    /// Printable name of the delimiter
    pub fn delimiter_name(&self) -> &'static str {
        match self.delimiter {
            b',' => "comma",
            b';' => "semicolon",
            b'\t' => "tab",
            b'|' => "pipe",
            _ => "other",
        }
    }
}

/// Detect the dialect of `content`, falling back to comma/double-quote
pub fn detect(content: &str) -> Dialect {
    sniff(content).unwrap_or_default()
}

/// Try to infer the delimiter from a leading sample of `content`
///
/// Each candidate is scored by how many sampled lines have the same field
/// count as the first line. A candidate whose first line has fewer than two
/// fields is not considered. Returns `None` when no candidate qualifies.
/// Ties involving the comma resolve to the comma.
pub fn sniff(content: &str) -> Option<Dialect> {
    let sample = sample_lines(content);

    let mut best: Option<(usize, Vec<u8>)> = None;
    for &delimiter in CANDIDATE_DELIMITERS {
        let Some(score) = score_delimiter(sample, delimiter) else {
            continue;
        };
        match &mut best {
            Some((top, tied)) if score == *top => tied.push(delimiter),
            Some((top, _)) if score < *top => {}
            Some(slot) => *slot = (score, vec![delimiter]),
            None => best = Some((score, vec![delimiter])),
        }
    }

    let (_, tied) = best?;
    let delimiter = if tied.contains(&b',') { b',' } else { tied[0] };
    Some(Dialect {
        delimiter,
        ..Dialect::default()
    })
}

/// First `SAMPLE_CHARS` characters, cut back to the last complete line when
/// the content continues past the sample
fn sample_lines(content: &str) -> &str {
    let Some((cut, _)) = content.char_indices().nth(SAMPLE_CHARS) else {
        return content;
    };
    let sample = &content[..cut];
    match sample.rfind('\n') {
        Some(end) if end > 0 => &sample[..end],
        _ => sample,
    }
}

fn score_delimiter(sample: &str, delimiter: u8) -> Option<usize> {
    let dialect = Dialect {
        delimiter,
        ..Dialect::default()
    };
    let mut reader = dialect.reader(sample);

    let mut widths = Vec::new();
    for record in reader.records() {
        widths.push(record.ok()?.len());
    }

    let first = *widths.first()?;
    if first < 2 {
        return None;
    }
    Some(widths.iter().filter(|&&w| w == first).count())
}
