//! File writers for flattened events.

use crate::Result;
use simhits_core::{FlattenedOutput, HitArrays, TrackScalars};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for flattened event output.
///
/// Skipped events write nothing.
pub struct FlattenedFileWriter {
    writer: BufWriter<File>,
    wrote_header: bool,
}

impl FlattenedFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self {
            writer,
            wrote_header: false,
        })
    }

    /// Writes one event as CSV, one row per hit.
    ///
    /// The header row is written before the first event.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_event_csv(&mut self, event_id: i32, output: &FlattenedOutput) -> Result<()> {
        let (Some(s), Some(arrays)) = (output.scalars(), output.arrays()) else {
            return Ok(());
        };

        if !self.wrote_header {
            writeln!(self.writer, "event_id,x,y,z,edep,index,pmtid,npe,hittime")?;
            self.wrote_header = true;
        }

        for i in 0..arrays.len() {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{}",
                event_id,
                s.x,
                s.y,
                s.z,
                s.edep,
                i,
                arrays.pmt_id[i],
                arrays.npe[i],
                arrays.hit_time[i]
            )?;
        }
        Ok(())
    }

    /// Writes one event as binary data.
    ///
    /// Format: i32 (`event_id`) + 4 × f64 (x, y, z, edep) + u32 (`n_hits`),
    /// then `n_hits` × (i32 pmtid + i32 npe + f64 hittime), all little-endian.
    /// Total: 40 + 16 × `n_hits` bytes per event
    ///
    /// # Errors
    /// Returns an error if writing fails or the hit count exceeds `u32`.
    pub fn write_event_binary(&mut self, event_id: i32, output: &FlattenedOutput) -> Result<()> {
        let (Some(s), Some(arrays)) = (output.scalars(), output.arrays()) else {
            return Ok(());
        };
        self.write_binary_header(event_id, s, arrays)?;

        for ((pmt_id, npe), hit_time) in arrays
            .pmt_id
            .iter()
            .zip(&arrays.npe)
            .zip(&arrays.hit_time)
        {
            self.writer.write_all(&pmt_id.to_le_bytes())?;
            self.writer.write_all(&npe.to_le_bytes())?;
            self.writer.write_all(&hit_time.to_le_bytes())?;
        }
        Ok(())
    }

    fn write_binary_header(
        &mut self,
        event_id: i32,
        s: &TrackScalars,
        arrays: &HitArrays,
    ) -> Result<()> {
        let n_hits = u32::try_from(arrays.len()).map_err(|_| {
            crate::Error::InvalidFormat(format!(
                "event {event_id}: hit count {} exceeds u32 range",
                arrays.len()
            ))
        })?;
        self.writer.write_all(&event_id.to_le_bytes())?;
        for v in [s.x, s.y, s.z, s.edep] {
            self.writer.write_all(&v.to_le_bytes())?;
        }
        self.writer.write_all(&n_hits.to_le_bytes())?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simhits_core::{EventFlattening, HitArrayExtractor, SimEvent, SimHit, SimTrack};
    use tempfile::NamedTempFile;

    fn flattened() -> FlattenedOutput {
        let event = SimEvent::new(1)
            .with_track(SimTrack::new(1.5, 2.5, 3.5, 0.5))
            .with_hit(SimHit::new(10, 2, 1.25))
            .with_hit(SimHit::new(20, 5, 2.5));
        HitArrayExtractor::new().extract(&event).unwrap()
    }

    #[test]
    fn test_write_event_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = FlattenedFileWriter::create(file.path()).unwrap();

        writer.write_event_csv(1, &flattened()).unwrap();
        writer.write_event_csv(2, &FlattenedOutput::Skipped).unwrap();
        writer.write_event_csv(3, &flattened()).unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "event_id,x,y,z,edep,index,pmtid,npe,hittime");
        assert_eq!(lines[1], "1,1.5,2.5,3.5,0.5,0,10,2,1.25");
        assert_eq!(lines[2], "1,1.5,2.5,3.5,0.5,1,20,5,2.5");
        assert!(lines[3].starts_with("3,"));
    }

    #[test]
    fn test_write_event_binary() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = FlattenedFileWriter::create(file.path()).unwrap();

        writer.write_event_binary(1, &flattened()).unwrap();
        writer.write_event_binary(2, &FlattenedOutput::Skipped).unwrap();
        writer.flush().unwrap();

        let data = std::fs::read(file.path()).unwrap();
        // 4 (i32) + 32 (4 x f64) + 4 (u32) + 2 x 16 (hits) = 72 bytes
        assert_eq!(data.len(), 72);
        assert_eq!(&data[36..40], &2u32.to_le_bytes());
    }
}
