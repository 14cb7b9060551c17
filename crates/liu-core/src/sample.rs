//! PCM 采样类型与声道转换工具.
//!
//! 解码输出统一为 32 位浮点交错格式, 标称幅度范围 [-1.0, 1.0].

/// 解码输出的采样类型
pub type Sample = f32;

/// 静音采样值
pub const SAMPLE_ZERO: Sample = 0.0;

/// 单声道原地扩展为双声道
///
/// `buf` 的前 `frames` 个采样为单声道数据, 转换后前 `frames * 2` 个采样为
/// 左右声道相同的立体声数据. 从尾部向前写入, 不需要额外缓冲.
pub fn double_mono_to_stereo(buf: &mut [Sample], frames: usize) {
    debug_assert!(buf.len() >= frames * 2);
    for i in (0..frames).rev() {
        let value = buf[i];
        buf[i * 2] = value;
        buf[i * 2 + 1] = value;
    }
}

/// 多声道原地裁剪为双声道 (只保留前两个声道)
///
/// 输入为 `frames * channels` 个交错采样, 输出覆盖前 `frames * 2` 个采样.
/// 写位置永远不超过读位置, 因此可以原地进行.
pub fn keep_first_two_channels(buf: &mut [Sample], frames: usize, channels: usize) {
    debug_assert!(channels >= 2);
    debug_assert!(buf.len() >= frames * channels);
    for i in 0..frames {
        let src = i * channels;
        buf[i * 2] = buf[src];
        buf[i * 2 + 1] = buf[src + 1];
    }
}

/// 从多声道源缓冲复制前两个声道到目标缓冲
pub fn copy_first_two_channels(
    dst: &mut [Sample],
    src: &[Sample],
    frames: usize,
    channels: usize,
) {
    debug_assert!(channels >= 2);
    for (frame, out) in src
        .chunks_exact(channels)
        .zip(dst.chunks_exact_mut(2))
        .take(frames)
    {
        out[0] = frame[0];
        out[1] = frame[1];
    }
}
