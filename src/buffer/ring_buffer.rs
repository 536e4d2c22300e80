//! 环形缓冲区 - 滑动窗口核心数据结构
//!
//! @yutiansut @quantaxis
//!
//! 基于取模下标的定长数组实现：
//! - O(1) 插入、过期、弹出
//! - 批量丢弃最旧的 n 个元素 O(n)
//! - 固定内存分配，容量在构造时确定

/// 泛型环形缓冲区
///
/// 写满之后，每次 `push` 恰好淘汰一个最旧元素 (FIFO)。
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// 内部存储，长度恒为容量
    slots: Vec<Option<T>>,
    /// 最旧元素下标
    head: usize,
    /// 下一个写入位置
    tail: usize,
    /// 当前元素数量
    size: usize,
}

impl<T> RingBuffer<T> {
    /// 创建指定容量的环形缓冲区
    ///
    /// # Panics
    ///
    /// `capacity == 0` 时 panic，窗口大小应由算子构造时校验。
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be positive");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            tail: 0,
            size: 0,
        }
    }

    /// 推入新元素，如果已满则淘汰最旧的元素
    /// 返回被淘汰的元素（如果有）
    pub fn push(&mut self, value: T) -> Option<T> {
        let capacity = self.slots.len();
        let evicted = self.slots[self.tail].replace(value);
        self.tail = (self.tail + 1) % capacity;

        if self.size < capacity {
            self.size += 1;
            None
        } else {
            self.head = (self.head + 1) % capacity;
            evicted
        }
    }

    /// 弹出最旧元素，空时返回 None
    pub fn pop_front(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        let value = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.size -= 1;
        value
    }

    /// 丢弃最旧的 n 个元素
    ///
    /// `n == 0` 时无操作；`n >= len()` 时清空。
    pub fn drop_front(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if n >= self.size {
            self.clear();
            return;
        }
        for _ in 0..n {
            self.slots[self.head] = None;
            self.head = (self.head + 1) % self.slots.len();
        }
        self.size -= n;
    }

    /// 获取最新元素
    pub fn latest(&self) -> Option<&T> {
        if self.size == 0 {
            return None;
        }
        let capacity = self.slots.len();
        self.slots[(self.tail + capacity - 1) % capacity].as_ref()
    }

    /// 获取最旧元素
    pub fn oldest(&self) -> Option<&T> {
        if self.size == 0 {
            return None;
        }
        self.slots[self.head].as_ref()
    }

    /// 获取指定位置的元素（0 = 最旧）
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size {
            return None;
        }
        self.slots[(self.head + index) % self.slots.len()].as_ref()
    }

    /// 当前元素数量
    pub fn len(&self) -> usize {
        self.size
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// 是否已满
    pub fn is_full(&self) -> bool {
        self.size == self.slots.len()
    }

    /// 容量
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 清空缓冲区
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.size = 0;
    }

    /// 迭代器（从旧到新）
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.size).filter_map(move |i| self.get(i))
    }
}

impl<T: Clone> RingBuffer<T> {
    /// 按从旧到新的顺序复制出全部元素
    pub fn snapshot(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_basic() {
        let mut buf: RingBuffer<i32> = RingBuffer::new(3);

        assert!(buf.is_empty());
        assert!(!buf.is_full());

        assert_eq!(buf.push(1), None);
        assert_eq!(buf.push(2), None);
        assert_eq!(buf.push(3), None);

        assert!(buf.is_full());
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.oldest(), Some(&1));
        assert_eq!(buf.latest(), Some(&3));

        // 溢出
        let expired = buf.push(4);
        assert_eq!(expired, Some(1));
        assert_eq!(buf.oldest(), Some(&2));
        assert_eq!(buf.latest(), Some(&4));
        assert_eq!(buf.snapshot(), vec![2, 3, 4]);
    }

    #[test]
    fn test_snapshot_keeps_last_capacity_pushes() {
        let mut buf = RingBuffer::new(2);
        buf.push("A");
        buf.push("B");
        buf.push("C");
        assert_eq!(buf.snapshot(), vec!["B", "C"]);

        for pushes in 1..20 {
            let mut buf = RingBuffer::new(5);
            for i in 0..pushes {
                buf.push(i);
            }
            let expected: Vec<i32> = (0..pushes).skip((pushes as usize).saturating_sub(5)).collect();
            assert_eq!(buf.len(), expected.len());
            assert_eq!(buf.snapshot(), expected);
        }
    }

    #[test]
    fn test_pop_front() {
        let mut buf = RingBuffer::new(2);
        assert_eq!(buf.pop_front(), None);

        buf.push(1);
        buf.push(2);
        buf.push(3);
        assert_eq!(buf.pop_front(), Some(2));
        assert_eq!(buf.pop_front(), Some(3));
        assert_eq!(buf.pop_front(), None);
        assert!(buf.is_empty());

        // 弹空后仍可继续写入
        buf.push(4);
        assert_eq!(buf.snapshot(), vec![4]);
    }

    #[test]
    fn test_drop_front() {
        let mut buf = RingBuffer::new(4);
        for i in 1..=6 {
            buf.push(i);
        }
        // [3, 4, 5, 6]
        buf.drop_front(0);
        assert_eq!(buf.len(), 4);

        buf.drop_front(2);
        assert_eq!(buf.snapshot(), vec![5, 6]);

        buf.push(7);
        buf.push(8);
        buf.push(9);
        assert_eq!(buf.snapshot(), vec![6, 7, 8, 9]);

        buf.drop_front(10);
        assert!(buf.is_empty());
        assert_eq!(buf.oldest(), None);
        assert_eq!(buf.latest(), None);
    }

    #[test]
    fn test_get_wraps() {
        let mut buf = RingBuffer::new(3);
        for i in 0..5 {
            buf.push(i);
        }
        assert_eq!(buf.get(0), Some(&2));
        assert_eq!(buf.get(2), Some(&4));
        assert_eq!(buf.get(3), None);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = RingBuffer::<u8>::new(0);
    }
}
