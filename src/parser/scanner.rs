//! バイトスキャナー
//!
//! 許可されたバイト範囲の外にある最初のバイトを探す。
//! 8 バイト単位のブロックで判定し、残りを 1 バイトずつ処理する。
//! どちらの経路でも返す位置は同じ。

/// 許可するバイト範囲の集合 (最大 8 区間、両端を含む)
#[derive(Debug, Clone)]
pub(crate) struct ByteRanges {
    table: [bool; 256],
}

impl ByteRanges {
    pub(crate) const MAX_RANGES: usize = 8;

    pub(crate) const fn new(ranges: &[(u8, u8)]) -> Self {
        assert!(ranges.len() <= Self::MAX_RANGES);
        let mut table = [false; 256];
        let mut i = 0;
        while i < ranges.len() {
            let (low, high) = ranges[i];
            let mut b = low as usize;
            while b <= high as usize {
                table[b] = true;
                b += 1;
            }
            i += 1;
        }
        Self { table }
    }

    #[inline(always)]
    pub(crate) const fn contains(&self, b: u8) -> bool {
        self.table[b as usize]
    }
}

/// 範囲外の最初のバイト位置を返す (見つからなければ `buf.len()`)
#[inline]
pub(crate) fn find_outside(buf: &[u8], ranges: &ByteRanges) -> usize {
    let mut blocks = buf.chunks_exact(8);
    let mut pos = 0;
    for block in &mut blocks {
        let all = ranges.contains(block[0])
            & ranges.contains(block[1])
            & ranges.contains(block[2])
            & ranges.contains(block[3])
            & ranges.contains(block[4])
            & ranges.contains(block[5])
            & ranges.contains(block[6])
            & ranges.contains(block[7]);
        if !all {
            return pos + find_outside_scalar(block, ranges);
        }
        pos += 8;
    }
    pos + find_outside_scalar(blocks.remainder(), ranges)
}

#[inline]
fn find_outside_scalar(buf: &[u8], ranges: &ByteRanges) -> usize {
    buf.iter()
        .position(|&b| !ranges.contains(b))
        .unwrap_or(buf.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINTABLE: ByteRanges = ByteRanges::new(&[(0x21, 0x7e)]);

    #[test]
    fn empty() {
        assert_eq!(find_outside(b"", &PRINTABLE), 0);
    }

    #[test]
    fn none_found() {
        assert_eq!(find_outside(b"abcdefghijklmnopq", &PRINTABLE), 17);
    }

    #[test]
    fn found_in_block_and_tail() {
        assert_eq!(find_outside(b"abc def", &PRINTABLE), 3);
        assert_eq!(find_outside(b"abcdefgh ij", &PRINTABLE), 8);
        assert_eq!(find_outside(b"abcdefghijklmn\r", &PRINTABLE), 14);
    }

    #[test]
    fn block_path_matches_scalar_path() {
        let ranges = ByteRanges::new(&[(b'\t', b'\t'), (0x20, 0x7e), (0x80, 0xff)]);
        let data: Vec<u8> = (0u8..=255).cycle().take(1024).collect();
        for start in 0..64 {
            for end in start..start + 40 {
                let slice = &data[start..end];
                assert_eq!(
                    find_outside(slice, &ranges),
                    find_outside_scalar(slice, &ranges)
                );
            }
        }
    }

    #[test]
    fn multiple_ranges() {
        let ranges = ByteRanges::new(&[(b'0', b'9'), (b'a', b'f')]);
        assert!(ranges.contains(b'5'));
        assert!(ranges.contains(b'f'));
        assert!(!ranges.contains(b'g'));
        assert_eq!(find_outside(b"0123456789abcdefg", &ranges), 16);
    }
}
