use std::fs;

use anyhow::Context;

use crate::{
    bitio::{BitReader, BitWriter},
    codec,
};

pub fn compress(input: &str, output: &str, stats: bool) -> anyhow::Result<()> {
    let bytes = fs::read(input).context(format!("reading from {input}"))?;
    let mut reader = BitReader::new(&bytes);
    let mut writer = BitWriter::new();
    codec::compress(&mut reader, &mut writer);
    let packed = writer.into_bytes();
    fs::write(output, &packed).context(format!("writing to {output}"))?;
    if stats {
        println!(
            "{} bytes in, {} bytes out ({:.1}% of original)",
            bytes.len(),
            packed.len(),
            packed.len() as f64 / bytes.len().max(1) as f64 * 100.0
        );
    }
    Ok(())
}

pub fn decompress(input: &str, output: &str) -> anyhow::Result<()> {
    let bytes = fs::read(input).context(format!("reading from {input}"))?;
    let mut reader = BitReader::new(&bytes);
    let mut writer = BitWriter::new();
    codec::decompress(&mut reader, &mut writer).context(format!("decoding {input}"))?;
    fs::write(output, writer.into_bytes()).context(format!("writing to {output}"))?;
    Ok(())
}

pub fn inspect(file: &str) -> anyhow::Result<()> {
    let bytes = fs::read(file).context(format!("reading from {file}"))?;
    let summary = codec::summarize(&mut BitReader::new(&bytes))
        .context(format!("reading the header of {file}"))?;
    print!("{summary}");
    Ok(())
}
