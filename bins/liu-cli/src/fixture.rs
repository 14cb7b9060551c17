//! 测试用输入构造.

use std::path::PathBuf;

use liu::codec::LappedHeader;

use crate::input::{InputArgs, InputFormat};

pub const RATE: u32 = 8000;

pub fn input_args(format: InputFormat) -> InputArgs {
    InputArgs {
        input: PathBuf::from("memory"),
        format,
        pcm_codec: "pcm_s16le".to_string(),
        channels: 2,
        rate: RATE,
        block_frames: 256,
    }
}

/// 确定性的伪随机信号
fn signal(index: usize) -> i16 {
    ((index as u32).wrapping_mul(2_654_435_761) >> 20) as i16 - 2048
}

/// 构造重叠块分帧流, 每块重叠 4 帧
pub fn framed_stream(channels: u8, block_frames: &[u16]) -> Vec<u8> {
    const OVERLAP: u8 = 4;
    let mut data = Vec::new();
    let mut index = 0;
    for frames in block_frames {
        let values = (*frames as usize + OVERLAP as usize) * channels as usize;
        let mut payload = Vec::with_capacity(values * 2);
        for _ in 0..values {
            payload.extend_from_slice(&signal(index).to_le_bytes());
            index += 1;
        }
        let header = LappedHeader::for_payload(channels, OVERLAP, *frames, RATE, &payload);
        data.extend_from_slice(&header.to_bytes());
        data.extend_from_slice(&payload);
    }
    data
}
