//! Random samples of records for test and tuning sets.
//!
//! One pass of reservoir sampling over the input, so files of any size can
//! be sampled in bounded memory. Suppressed records are never sampled.
//! Sampled records are written in their original input order.

use crate::error::Result;
use crate::extract::is_suppressed;
use crate::formats::{FormatReader, FormatWriter};
use crate::record::Record;
use crate::tables::IdentifierRules;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// Counters for one sampling run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleStats {
    /// Records read
    pub records: usize,
    /// Records eligible for sampling
    pub eligible: usize,
    /// Records skipped because they could not be read
    pub errors: usize,
    /// Records written
    pub written: usize,
}

/// Reservoir sampler.
#[derive(Debug)]
pub struct Sampler<'a> {
    size: usize,
    rules: &'a IdentifierRules,
    rng: StdRng,
}

impl<'a> Sampler<'a> {
    /// Sampler drawing up to `size` records. A `seed` makes the draw
    /// repeatable.
    #[must_use]
    pub fn new(size: usize, rules: &'a IdentifierRules, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Sampler { size, rules, rng }
    }

    /// Draw the sample from `reader`, in input order. Unreadable records are
    /// skipped; a stream-fatal error ends the draw.
    pub fn draw<R: FormatReader>(&mut self, reader: &mut R, stats: &mut SampleStats) -> Vec<Record> {
        let mut reservoir: Vec<(usize, Record)> = Vec::with_capacity(self.size);

        loop {
            let record = match reader.read_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(e) => {
                    stats.records += 1;
                    stats.errors += 1;
                    warn!(position = reader.position(), error = %e, "record skipped");
                    if e.is_stream_fatal() {
                        break;
                    }
                    continue;
                },
            };
            stats.records += 1;
            if is_suppressed(&record, self.rules) {
                continue;
            }

            let seen = stats.eligible;
            stats.eligible += 1;
            if reservoir.len() < self.size {
                reservoir.push((seen, record));
            } else {
                let slot = self.rng.gen_range(0..=seen);
                if slot < self.size {
                    reservoir[slot] = (seen, record);
                }
            }
        }

        reservoir.sort_by_key(|(position, _)| *position);
        reservoir.into_iter().map(|(_, record)| record).collect()
    }

    /// Draw a sample from `reader` and write it to `writer`.
    ///
    /// # Errors
    ///
    /// Returns the writer's error if the sample cannot be written.
    pub fn run<R: FormatReader, W: FormatWriter>(&mut self, reader: &mut R, writer: &mut W) -> Result<SampleStats> {
        let mut stats = SampleStats::default();
        let sample = self.draw(reader, &mut stats);
        writer.write_batch(&sample)?;
        writer.finish()?;
        stats.written = sample.len();
        info!(
            records = stats.records,
            eligible = stats.eligible,
            written = stats.written,
            "sample written"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;
    use crate::reader::MarcReader;
    use crate::record::Field;
    use crate::writer::{encode_record, MarcWriter};
    use std::io::Cursor;

    fn records(n: usize) -> Vec<u8> {
        (0..n)
            .flat_map(|i| {
                let mut record = Record::new(Leader::default());
                record.add_control_field_str("001", &format!("{i:04}"));
                if i % 10 == 0 {
                    let mut f999 = Field::new("999".to_string(), ' ', ' ');
                    f999.add_subfield_str('f', "n");
                    record.add_field(f999);
                }
                encode_record(&record).unwrap()
            })
            .collect()
    }

    fn ids(sample: &[Record]) -> Vec<String> {
        sample
            .iter()
            .map(|r| r.get_control_field("001").unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_sample_size_order_and_suppression() {
        let rules = IdentifierRules::default();
        let mut reader = MarcReader::new(Cursor::new(records(100)));
        let mut stats = SampleStats::default();
        let sample = Sampler::new(10, &rules, Some(7)).draw(&mut reader, &mut stats);

        assert_eq!(stats.records, 100);
        assert_eq!(stats.eligible, 90);
        assert_eq!(sample.len(), 10);
        let ids = ids(&sample);
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(ids.iter().all(|id| !id.ends_with('0')));
    }

    #[test]
    fn test_seed_is_repeatable() {
        let rules = IdentifierRules::default();
        let draw = |seed| {
            let mut reader = MarcReader::new(Cursor::new(records(50)));
            ids(&Sampler::new(5, &rules, Some(seed)).draw(&mut reader, &mut SampleStats::default()))
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_small_input_taken_whole() {
        let rules = IdentifierRules::default();
        let mut reader = MarcReader::new(Cursor::new(records(5)));
        let mut out = MarcWriter::new(Vec::new());
        let stats = Sampler::new(10, &rules, None).run(&mut reader, &mut out).unwrap();
        assert_eq!(stats.written, 4);
        assert_eq!(out.records_written(), 4);
    }
}
