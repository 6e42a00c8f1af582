#![no_main]

use libfuzzer_sys::fuzz_target;
use mzdb::codec::BlobDecoder;
use mzdb::model::{ByteOrder, Compression, DataEncoding, DataMode, PeakEncoding};

fuzz_target!(|data: &[u8]| {
    // First byte picks the encoding, the rest is the blob
    let Some((&selector, blob)) = data.split_first() else {
        return;
    };

    let encoding = DataEncoding {
        id: 1,
        mode: match selector & 0b11 {
            0 => DataMode::Profile,
            1 => DataMode::Centroid,
            _ => DataMode::Fitted,
        },
        peak_encoding: match (selector >> 2) & 0b11 {
            0 => PeakEncoding::LowRes,
            1 => PeakEncoding::HighRes,
            _ => PeakEncoding::NoLoss,
        },
        compression: if selector & 0b1_0000 != 0 {
            Compression::Zlib
        } else {
            Compression::None
        },
        byte_order: if selector & 0b10_0000 != 0 {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        },
    };

    // Must either decode or fail, never panic
    let Ok(bytes) = BlobDecoder::decompress(blob, &encoding) else {
        return;
    };
    // Even spectrum ids are read with the other peak width
    let other = DataEncoding {
        peak_encoding: match encoding.peak_encoding {
            PeakEncoding::NoLoss => PeakEncoding::LowRes,
            _ => PeakEncoding::NoLoss,
        },
        ..encoding.clone()
    };
    let index = BlobDecoder::index(1, &bytes, encoding.byte_order, |spectrum_id| {
        Ok(if spectrum_id % 2 == 0 {
            other.clone()
        } else {
            encoding.clone()
        })
    });
    if let Ok(index) = index {
        for slice in &index.slices {
            let _ = BlobDecoder::read_slice(&bytes, slice, None);
            let _ = BlobDecoder::read_slice(&bytes, slice, Some((400.0, 500.0)));
        }
    }
});
