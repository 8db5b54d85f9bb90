//! 字符串相似度：与 difflib 的 `SequenceMatcher.ratio()` 相同的 Ratcliff/Obershelp 比值。

use std::collections::HashMap;

/// 返回 `2 * M / (len(a) + len(b))`，M 为所有匹配块的字符总数；两个空串视为完全相同
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// 递归地取最长公共块，再分别处理其左右两侧
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// a[alo..ahi] 与 b[blo..bhi] 的最长公共块；等长时取 a 中最靠前、其次 b 中最靠前者
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // j → 以 a[i-1]、b[j] 结尾的公共块长度
    let mut run: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_run = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_run.insert(j, k);
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            }
        }
        run = next_run;
    }

    (best_i, best_j, best_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_and_disjoint() {
        assert!(close(ratio("lumos", "lumos"), 1.0));
        assert!(close(ratio("abc", "xyz"), 0.0));
        assert!(close(ratio("", ""), 1.0));
        assert!(close(ratio("abc", ""), 0.0));
    }

    #[test]
    fn known_difflib_values() {
        // SequenceMatcher(None, "abcd", "bcde").ratio() == 0.75
        assert!(close(ratio("abcd", "bcde"), 0.75));
        // "prot" + "o" 共 5 个匹配字符
        assert!(close(ratio("protaxo", "protego"), 10.0 / 14.0));
        // "ting" + "te"
        assert!(close(ratio("testing", "tenting"), 12.0 / 14.0));
    }

    #[test]
    fn block_order_matters() {
        // 最长块 "ab" 之后，右侧 "c" 与左侧 "c" 不能交叉匹配
        assert!(close(ratio("cab", "abc"), 4.0 / 6.0));
    }

    #[test]
    fn symmetric_for_simple_inputs() {
        assert!(close(ratio("lumos", "lumis"), ratio("lumis", "lumos")));
    }
}
