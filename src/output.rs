// src/output.rs
use crate::mc::ensemble::Ensemble;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// One row per time point: `time,replicate_0,replicate_1,...`
pub fn write_ensemble_to_csv(filename: &str, ensemble: &Ensemble) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    write_ensemble(&mut file, ensemble)?;
    file.flush()
}

pub fn write_ensemble<W: Write>(out: &mut W, ensemble: &Ensemble) -> io::Result<()> {
    write!(out, "time")?;
    for i in 0..ensemble.replicates() {
        write!(out, ",replicate_{}", i)?;
    }
    writeln!(out)?;

    for (j, t) in ensemble.times().iter().enumerate() {
        write!(out, "{}", t)?;
        for path in ensemble.paths() {
            write!(out, ",{}", path[j])?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_summary_to_csv(filename: &str, summary_data: &[(&str, &str)]) -> io::Result<()> {
    let mut file = File::create(filename)?;
    for (key, value) in summary_data {
        writeln!(file, "{},{}", key, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ou_process::{evaluate, OuParams};

    #[test]
    fn test_ensemble_csv_layout() {
        let params = OuParams::new(0.5, 1.0, 1.0, 0.0);
        let a = evaluate(2, &[0.0, 0.0], &params).unwrap();
        let b = evaluate(2, &[0.0, 0.0], &OuParams { x0: 2.0, ..params }).unwrap();
        let ensemble = Ensemble::from_paths(vec![a, b], params).unwrap();

        let mut buf = Vec::new();
        write_ensemble(&mut buf, &ensemble).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "time,replicate_0,replicate_1");
        assert_eq!(lines[1], "0,1,2");
        assert!(lines[2].starts_with("0.5,"));
    }
}
