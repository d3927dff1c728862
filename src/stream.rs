use crate::matches::consolidate_overlapping_matches;
use crate::{
    Bytes, Elements, Match, SearchError, SearchKind, SearchLimits, SearchParams,
};
use log::trace;
use std::io::{ErrorKind, Read};

/// Default window budget for the chunked searches, in elements.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Fills `buf` as far as the reader allows; a short count means end of input.
fn read_full<R: Read>(reader: &mut R, mut buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while !buf.is_empty() {
        match reader.read(buf) {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                let rest = buf;
                buf = &mut rest[n..];
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Priming,
    Running,
    Done,
}

/// Lazy iterator over the raw (pre-consolidation) matches of a byte stream.
///
/// The text is pulled through a single pre-allocated window buffer;
/// successive windows overlap by enough elements that no potential match is
/// ever split, so every match of the underlying text is reported; matches
/// falling inside an overlap may be reported once per window. Offsets are
/// relative to the whole stream and `matched` is copied out of the window.
///
/// Pass the collected output through
/// [`consolidate_overlapping_matches`](crate::consolidate_overlapping_matches)
/// (or use [`find_near_matches_in_reader`]) to obtain the same result as an
/// in-memory search.
pub struct StreamRawMatches<R> {
    reader: R,
    pattern: Vec<u8>,
    params: SearchParams,
    kind: SearchKind,
    overlap: usize,
    buf: Vec<u8>,
    filled: usize,
    offset: usize,
    pending: std::vec::IntoIter<Match<Vec<u8>>>,
    state: StreamState,
}

impl<R: Read> StreamRawMatches<R> {
    fn search_window(&mut self) -> Result<(), SearchError> {
        let window = Bytes(&self.buf[..self.filled]);
        let found = self
            .kind
            .search_raw(Bytes(&self.pattern), window, &self.params)?;
        trace!(
            "searched window at offset {} ({} elements, {} raw matches)",
            self.offset,
            self.filled,
            found.len()
        );
        let offset = self.offset;
        self.pending = found
            .into_iter()
            .map(|m| m.map_matched(|s: Bytes| s.as_slice().to_vec()).rebase(offset))
            .collect::<Vec<_>>()
            .into_iter();
        Ok(())
    }

    /// Reads the next window and searches it. Returns `false` once the
    /// stream is exhausted.
    fn advance(&mut self) -> Result<bool, SearchError> {
        match self.state {
            StreamState::Done => Ok(false),
            StreamState::Priming => {
                self.filled = read_full(&mut self.reader, &mut self.buf)?;
                self.state = if self.filled < self.buf.len() {
                    StreamState::Done
                } else {
                    StreamState::Running
                };
                self.search_window()?;
                Ok(true)
            }
            StreamState::Running => {
                // keep the overlap so no match can straddle a boundary
                let keep = self.overlap;
                self.buf.copy_within(self.filled - keep..self.filled, 0);
                self.offset += self.filled - keep;
                let n = read_full(&mut self.reader, &mut self.buf[keep..])?;
                if n == 0 {
                    // the retained tail was already searched last round
                    self.state = StreamState::Done;
                    return Ok(false);
                }
                self.filled = keep + n;
                if self.filled < self.buf.len() {
                    self.state = StreamState::Done;
                }
                self.search_window()?;
                Ok(true)
            }
        }
    }
}

impl<R: Read> Iterator for StreamRawMatches<R> {
    type Item = Result<Match<Vec<u8>>, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(m) = self.pending.next() {
                return Some(Ok(m));
            }
            match self.advance() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    self.state = StreamState::Done;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Streams raw near-matches of `pattern` out of `reader`; see
/// [`StreamRawMatches`].
pub fn stream_raw_matches<R: Read>(
    pattern: &[u8],
    reader: R,
    limits: SearchLimits,
) -> Result<StreamRawMatches<R>, SearchError> {
    stream_raw_matches_with_chunk_size(pattern, reader, limits, DEFAULT_CHUNK_SIZE)
}

/// [`stream_raw_matches`] with an explicit window budget. The effective
/// window is at least one element longer than the required overlap.
pub fn stream_raw_matches_with_chunk_size<R: Read>(
    pattern: &[u8],
    reader: R,
    limits: SearchLimits,
    chunk_size: usize,
) -> Result<StreamRawMatches<R>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    let params = limits.normalize()?;
    let kind = SearchKind::select(&params);
    let m = pattern.len();
    let overlap = m - 1 + kind.extra_items_for_chunked_search(m, &params);
    let window_size = chunk_size.max(overlap + 1);
    Ok(StreamRawMatches {
        reader,
        pattern: pattern.to_vec(),
        params,
        kind,
        overlap,
        buf: vec![0; window_size],
        filled: 0,
        offset: 0,
        pending: Vec::new().into_iter(),
        state: StreamState::Priming,
    })
}

/// Searches a byte stream, returning the same consolidated matches an
/// in-memory [`find_near_matches`](crate::find_near_matches) over the whole
/// input would return, without ever holding more than one window of text.
///
/// ```rust
/// use fuzzy_substring::{find_near_matches_in_reader, SearchLimits};
///
/// let text: &[u8] = b"---PATERN---";
/// let matches =
///     find_near_matches_in_reader(b"PATTERN", text, SearchLimits::new().total(1))
///         .unwrap();
/// assert_eq!(matches.len(), 1);
/// assert_eq!((matches[0].start, matches[0].end, matches[0].dist), (3, 9, 1));
/// assert_eq!(matches[0].matched, b"PATERN");
/// ```
pub fn find_near_matches_in_reader<R: Read>(
    pattern: &[u8],
    reader: R,
    limits: SearchLimits,
) -> Result<Vec<Match<Vec<u8>>>, SearchError> {
    find_near_matches_in_reader_with_chunk_size(pattern, reader, limits, DEFAULT_CHUNK_SIZE)
}

/// [`find_near_matches_in_reader`] with an explicit window budget.
pub fn find_near_matches_in_reader_with_chunk_size<R: Read>(
    pattern: &[u8],
    reader: R,
    limits: SearchLimits,
    chunk_size: usize,
) -> Result<Vec<Match<Vec<u8>>>, SearchError> {
    let raw = stream_raw_matches_with_chunk_size(pattern, reader, limits, chunk_size)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(consolidate_overlapping_matches(raw))
}

/// Searches decoded text delivered in chunks by `next_chunk`, which is asked
/// for up to `n` characters at a time and signals end of input with an empty
/// chunk.
///
/// The text is handled per `char`; match offsets count characters from the
/// start of the stream and `matched` is the matched characters collected
/// into a `String`.
pub fn find_near_matches_in_chunks<F>(
    pattern: &str,
    next_chunk: F,
    limits: SearchLimits,
) -> Result<Vec<Match<String>>, SearchError>
where
    F: FnMut(usize) -> std::io::Result<String>,
{
    find_near_matches_in_chunks_with_chunk_size(pattern, next_chunk, limits, DEFAULT_CHUNK_SIZE)
}

/// [`find_near_matches_in_chunks`] with an explicit window budget.
pub fn find_near_matches_in_chunks_with_chunk_size<F>(
    pattern: &str,
    mut next_chunk: F,
    limits: SearchLimits,
    chunk_size: usize,
) -> Result<Vec<Match<String>>, SearchError>
where
    F: FnMut(usize) -> std::io::Result<String>,
{
    let pattern_chars: Vec<char> = pattern.chars().collect();
    if pattern_chars.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    let params = limits.normalize()?;
    let kind = SearchKind::select(&params);
    let m = pattern_chars.len();
    let overlap = m - 1 + kind.extra_items_for_chunked_search(m, &params);
    let window_size = chunk_size.max(overlap + 1);

    let mut window: Vec<char> = Vec::new();
    let mut offset = 0;
    let mut raw: Vec<Match<String>> = Vec::new();
    loop {
        let chunk = next_chunk(window_size)?;
        if chunk.is_empty() {
            break;
        }
        // the window is the retained tail plus the fresh chunk
        if window.len() > overlap {
            let advance = window.len() - overlap;
            window.drain(..advance);
            offset += advance;
        }
        window.extend(chunk.chars());

        let found = kind.search_raw(Elements(&pattern_chars), Elements(&window), &params)?;
        trace!(
            "searched text window at offset {offset} ({} chars, {} raw matches)",
            window.len(),
            found.len()
        );
        raw.extend(found.into_iter().map(|m| {
            m.map_matched(|s: Elements<char>| s.as_slice().iter().collect::<String>())
                .rebase(offset)
        }));
    }
    Ok(consolidate_overlapping_matches(raw))
}
