//! 双游标缓冲区.
//!
//! 固定容量, 带读写两个偏移:
//!
//! ```text
//! 0          read_offset         write_offset          capacity
//! |  已消费   |   待读取 (len)   |   尾部可写空间        |
//! ```
//!
//! 不变式: `read_offset <= write_offset <= capacity`. 待读取数据被完全消费时
//! 两个偏移同时归零, 下一次写入总能获得整块尾部空间.
//!
//! 解码输出暂存 (`SampleBuffer`) 和压缩数据输入暂存 (`ByteBuffer`) 共用此类型,
//! 只暴露带边界检查的增长/消费操作.

use crate::sample::Sample;

/// 固定容量的双游标缓冲区
#[derive(Debug, Clone)]
pub struct CursorBuffer<T> {
    /// 底层存储, 创建后不再重新分配
    data: Vec<T>,
    /// 读偏移
    read_offset: usize,
    /// 写偏移
    write_offset: usize,
}

/// 解码后 PCM 暂存区
pub type SampleBuffer = CursorBuffer<Sample>;

/// 压缩数据输入暂存区
pub type ByteBuffer = CursorBuffer<u8>;

impl<T: Copy + Default> CursorBuffer<T> {
    /// 创建指定容量的缓冲区
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![T::default(); capacity],
            read_offset: 0,
            write_offset: 0,
        }
    }

    /// 总容量
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// 待读取的元素数
    pub fn len(&self) -> usize {
        self.write_offset - self.read_offset
    }

    /// 是否没有待读取数据
    pub fn is_empty(&self) -> bool {
        self.read_offset == self.write_offset
    }

    /// 尾部可写容量
    pub fn tail_capacity(&self) -> usize {
        self.capacity() - self.write_offset
    }

    /// 当前读偏移
    pub fn read_offset(&self) -> usize {
        self.read_offset
    }

    /// 当前写偏移
    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// 丢弃所有数据, 偏移归零 (不释放存储)
    pub fn clear(&mut self) {
        self.read_offset = 0;
        self.write_offset = 0;
    }

    /// 待读取的数据
    pub fn readable(&self) -> &[T] {
        &self.data[self.read_offset..self.write_offset]
    }

    /// 尾部可写区域, 写入后需调用 `commit()` 确认
    pub fn writable(&mut self) -> &mut [T] {
        &mut self.data[self.write_offset..]
    }

    /// 确认尾部写入了 `count` 个元素
    ///
    /// 超出尾部容量的部分被截断, 返回实际确认的数量.
    pub fn commit(&mut self, count: usize) -> usize {
        let committed = count.min(self.tail_capacity());
        self.write_offset += committed;
        self.check_invariant();
        committed
    }

    /// 从头部消费最多 `count` 个元素, 返回被消费的数据
    ///
    /// 返回的切片在下一次修改缓冲区之前有效. 数据被完全消费后偏移归零.
    pub fn consume(&mut self, count: usize) -> &[T] {
        let consumed = count.min(self.len());
        let start = self.read_offset;
        self.read_offset += consumed;
        if self.read_offset == self.write_offset {
            self.read_offset = 0;
            self.write_offset = 0;
        }
        self.check_invariant();
        &self.data[start..start + consumed]
    }

    /// 向尾部追加数据, 返回实际写入的数量
    pub fn extend_from_slice(&mut self, src: &[T]) -> usize {
        let count = src.len().min(self.tail_capacity());
        self.data[self.write_offset..self.write_offset + count].copy_from_slice(&src[..count]);
        self.write_offset += count;
        count
    }

    fn check_invariant(&self) {
        debug_assert!(self.read_offset <= self.write_offset);
        debug_assert!(self.write_offset <= self.data.len());
        debug_assert!(!self.is_empty() || self.read_offset == 0);
    }
}
