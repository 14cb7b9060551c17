//! 音频源 (AudioSource) trait 定义.

use log::debug;
use liu_core::sample::{copy_first_two_channels, double_mono_to_stereo, keep_first_two_channels};
use liu_core::{FrameIndex, SAMPLE_ZERO, Sample};

use crate::properties::SourceProperties;

/// 音频源 trait
///
/// 提供帧精确的随机定位与顺序读取. 位置由 `current_frame_index()` 唯一确定,
/// 始终满足 `0 <= current_frame_index() <= frame_count`.
///
/// 读取和定位不以错误形式报告稳态解码问题: 返回值是实际读取的帧数或
/// 实际到达的位置, 调用方需要与请求值比较来发现截断或定位失败.
pub trait AudioSource: Send {
    /// 获取音频源属性
    fn properties(&self) -> &SourceProperties;

    /// 当前帧位置
    fn current_frame_index(&self) -> FrameIndex;

    /// 定位到指定帧, 返回实际到达的帧位置
    ///
    /// 超出总帧数的位置被截断到总帧数.
    fn seek_frame(&mut self, frame_index: FrameIndex) -> FrameIndex;

    /// 读取最多 `frame_count` 帧
    ///
    /// `buffer` 为 `None` 时只解码不输出 (丢弃读取). 读取帧数同时受剩余帧数
    /// 和 `buffer` 能容纳的整帧数限制. 返回实际读取的帧数, 位置前进同样的数量.
    fn read_frames(&mut self, frame_count: usize, buffer: Option<&mut [Sample]>) -> usize;

    /// 跳过最多 `frame_count` 帧, 返回实际跳过的帧数
    fn skip_frames(&mut self, frame_count: usize) -> usize {
        self.read_frames(frame_count, None)
    }

    /// 剩余帧数
    fn remaining_frames(&self) -> FrameIndex {
        self.properties()
            .frame_count
            .saturating_sub(self.current_frame_index())
    }

    /// 读取最多 `frame_count` 帧并转换为双声道
    ///
    /// 单声道复制到左右声道, 多于两个声道时只保留前两个. `buffer` 按双声道
    /// 交错布局, 返回实际读取的帧数.
    fn read_stereo_frames(&mut self, frame_count: usize, buffer: &mut [Sample]) -> usize {
        let channels = self.properties().channels as usize;
        let frames = frame_count.min(buffer.len() / 2);
        match channels {
            0 => 0,
            1 => {
                let read = self.read_frames(frames, Some(&mut buffer[..frames]));
                double_mono_to_stereo(buffer, read);
                read
            }
            2 => self.read_frames(frames, Some(buffer)),
            _ => {
                let needed = frames * channels;
                if buffer.len() >= needed {
                    let read = self.read_frames(frames, Some(&mut buffer[..needed]));
                    keep_first_two_channels(buffer, read, channels);
                    read
                } else {
                    debug!(
                        "性能: 缓冲区不足以容纳 {} 声道数据, 使用临时缓冲 ({} 个采样)",
                        channels, needed,
                    );
                    let mut temp = vec![SAMPLE_ZERO; needed];
                    let read = self.read_frames(frames, Some(&mut temp));
                    copy_first_two_channels(buffer, &temp, read, channels);
                    read
                }
            }
        }
    }

    /// 关闭音频源, 释放解码器与容器, 可重复调用
    ///
    /// 关闭后读取返回 0, 定位返回当前位置.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 内存中的交错 PCM, 采样值为 帧号 * 10 + 声道号
    struct RampSource {
        properties: SourceProperties,
        position: FrameIndex,
    }

    impl RampSource {
        fn new(channels: u32, frame_count: FrameIndex) -> Self {
            Self {
                properties: SourceProperties::new(channels, 8000, frame_count),
                position: 0,
            }
        }
    }

    impl AudioSource for RampSource {
        fn properties(&self) -> &SourceProperties {
            &self.properties
        }

        fn current_frame_index(&self) -> FrameIndex {
            self.position
        }

        fn seek_frame(&mut self, frame_index: FrameIndex) -> FrameIndex {
            self.position = frame_index.min(self.properties.frame_count);
            self.position
        }

        fn read_frames(&mut self, frame_count: usize, buffer: Option<&mut [Sample]>) -> usize {
            let channels = self.properties.channels as usize;
            let mut frames = frame_count.min(self.remaining_frames() as usize);
            if let Some(buf) = buffer {
                frames = frames.min(buf.len() / channels);
                for (i, out) in buf[..frames * channels].iter_mut().enumerate() {
                    let frame = self.position as usize + i / channels;
                    *out = (frame * 10 + i % channels) as Sample;
                }
            }
            self.position += frames as FrameIndex;
            frames
        }

        fn close(&mut self) {}
    }

    #[test]
    fn test_跳过与剩余帧数() {
        let mut source = RampSource::new(2, 10);
        assert_eq!(source.skip_frames(4), 4);
        assert_eq!(source.remaining_frames(), 6);
        assert_eq!(source.skip_frames(100), 6);
        assert_eq!(source.remaining_frames(), 0);
    }

    #[test]
    fn test_单声道转立体声() {
        let mut source = RampSource::new(1, 10);
        let mut buf = vec![0.0; 6];
        assert_eq!(source.read_stereo_frames(5, &mut buf), 3);
        assert_eq!(buf, vec![0.0, 0.0, 10.0, 10.0, 20.0, 20.0]);
    }

    #[test]
    fn test_立体声直接读取() {
        let mut source = RampSource::new(2, 10);
        source.seek_frame(8);
        let mut buf = vec![0.0; 8];
        assert_eq!(source.read_stereo_frames(4, &mut buf), 2);
        assert_eq!(&buf[..4], &[80.0, 81.0, 90.0, 91.0]);
    }

    #[test]
    fn test_多声道保留前两个声道() {
        // 缓冲区足够时原地转换
        let mut source = RampSource::new(3, 10);
        let mut buf = vec![0.0; 6];
        assert_eq!(source.read_stereo_frames(2, &mut buf), 2);
        assert_eq!(&buf[..4], &[0.0, 1.0, 10.0, 11.0]);

        // 缓冲区只能容纳双声道时使用临时缓冲
        let mut buf = vec![0.0; 4];
        assert_eq!(source.read_stereo_frames(2, &mut buf), 2);
        assert_eq!(buf, vec![20.0, 21.0, 30.0, 31.0]);
    }
}
