//! `verify` 子命令: 对比"定位后读取"与连续解码的结果.
//!
//! 每个定位目标都使用一个新打开的音频源, 与从头连续解码的参考结果比较,
//! 比较时使用解码器 (或配置文件) 给出的容差.

use anyhow::{Result, bail};
use clap::Args;
use liu::codec::SeekTolerance;
use liu::{AudioSource, Sample};
use log::debug;

use crate::input::{Input, InputArgs};

const CHUNK_FRAMES: usize = 4096;

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// 定位目标间隔 (帧)
    #[arg(long, default_value_t = 1000)]
    pub step: u64,

    /// 每个目标之后读取比较的帧数
    #[arg(long, default_value_t = 256)]
    pub length: usize,
}

/// 一个不一致的定位目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// 目标帧
    pub target: u64,
    /// 实际到达的帧
    pub reached: u64,
    /// 第一个超出容差的帧 (相对目标)
    pub first_frame: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub tolerance: SeekTolerance,
    pub targets: usize,
    pub mismatches: Vec<Mismatch>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// 连续解码整个流作为参考
fn decode_reference(input: &Input) -> Result<Vec<Sample>> {
    let mut source = input.open()?;
    let channels = source.properties().channels as usize;
    let mut reference = Vec::new();
    let mut buf = vec![0.0; CHUNK_FRAMES * channels];
    loop {
        let read = source.read_frames(CHUNK_FRAMES, Some(&mut buf));
        if read == 0 {
            break;
        }
        reference.extend_from_slice(&buf[..read * channels]);
    }
    Ok(reference)
}

pub fn verify(input: &Input, step: u64, length: usize) -> Result<VerifyReport> {
    if step == 0 {
        bail!("定位间隔不能为 0");
    }
    let reference = decode_reference(input)?;

    let probe = input.open()?;
    let channels = probe.properties().channels as usize;
    let frame_count = probe.properties().frame_count;
    let tolerance = probe.tolerance();
    drop(probe);

    let reference_frames = (reference.len() / channels) as u64;
    let mut targets: Vec<u64> = (0..frame_count).step_by(step as usize).collect();
    if frame_count > 0 && targets.last() != Some(&(frame_count - 1)) {
        targets.push(frame_count - 1);
    }

    let mut mismatches = Vec::new();
    let mut buf = vec![0.0; length * channels];
    for &target in &targets {
        let mut source = input.open()?;
        let reached = source.seek_frame(target);
        let read = source.read_frames(length, Some(&mut buf));

        let expected_frames = (length as u64).min(reference_frames.saturating_sub(target)) as usize;
        let start = (target as usize * channels).min(reference.len());
        let expected = &reference[start..start + expected_frames * channels];
        let first_sample = if reached != target {
            Some(0)
        } else {
            tolerance.first_mismatch(expected, &buf[..read * channels])
        };
        if let Some(sample) = first_sample {
            debug!("目标 {} 不一致: 到达 {}, 第 {} 个采样", target, reached, sample);
            mismatches.push(Mismatch {
                target,
                reached,
                first_frame: Some(sample / channels),
            });
        }
    }

    Ok(VerifyReport {
        tolerance,
        targets: targets.len(),
        mismatches,
    })
}

pub fn run(input: &Input, args: &VerifyArgs) -> Result<bool> {
    let report = verify(input, args.step, args.length)?;
    for mismatch in &report.mismatches {
        println!(
            "不一致: 目标第 {} 帧, 到达第 {} 帧, 目标后第 {} 帧起超出容差",
            mismatch.target,
            mismatch.reached,
            mismatch.first_frame.unwrap_or(0),
        );
    }
    println!(
        "校验 {} 个定位目标, {} 个不一致 (容差 {:?})",
        report.targets,
        report.mismatches.len(),
        report.tolerance,
    );
    Ok(report.passed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecodeProfile;
    use crate::fixture;
    use crate::input::InputFormat;

    fn framed_input(profile: DecodeProfile) -> Input {
        Input::from_bytes(
            fixture::framed_stream(2, &[100, 100, 100, 100, 100, 100]),
            fixture::input_args(InputFormat::Framed),
            profile,
        )
    }

    #[test]
    fn test_预解码后定位一致() {
        let report = verify(&framed_input(DecodeProfile::default()), 100, 50).unwrap();
        assert_eq!(report.targets, 7);
        assert_eq!(report.tolerance, SeekTolerance::Exact);
        assert!(report.passed(), "{:?}", report.mismatches);
    }

    #[test]
    fn test_不预解码时块首不一致() {
        let profile = DecodeProfile {
            prefetch_blocks: Some(0),
            tolerance: None,
        };
        let report = verify(&framed_input(profile), 100, 50).unwrap();
        assert!(!report.passed());
        // 第一块之前没有重叠尾部, 从头定位总是一致
        assert!(report.mismatches.iter().all(|m| m.target % 100 == 0 && m.target > 0));
        // 只有重叠的前 4 帧受影响
        assert!(
            report
                .mismatches
                .iter()
                .all(|m| matches!(m.first_frame, Some(frame) if frame < 4))
        );
    }

    #[test]
    fn test_定位间隔为零() {
        assert!(verify(&framed_input(DecodeProfile::default()), 0, 10).is_err());
    }
}
