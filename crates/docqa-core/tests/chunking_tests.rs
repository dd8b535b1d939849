use docqa_core::splitter::RecursiveSplitter;

/// Paragraphs of unique tokens (`t0 t1 ...`) so every window has exactly one
/// location in the source text.
fn sample_text() -> String {
    let mut token = 0usize;
    let mut paragraphs = Vec::new();
    for words in [12usize, 260, 40, 410, 3, 95] {
        let mut lines = Vec::new();
        let mut line = Vec::new();
        for i in 0..words {
            line.push(format!("t{token}"));
            token += 1;
            if i % 17 == 16 {
                lines.push(line.join(" "));
                line.clear();
            }
        }
        if !line.is_empty() {
            lines.push(line.join(" "));
        }
        paragraphs.push(lines.join("\n"));
    }
    paragraphs.join("\n\n")
}

/// Locate every window in order and return the byte ranges they cover.
fn covered_ranges(source: &str, windows: &[String]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut from = 0usize;
    for window in windows {
        let start = from + source[from..].find(window.as_str()).expect("window is a substring of the source");
        ranges.push((start, start + window.len()));
        from = start + 1;
    }
    ranges
}

#[test]
fn short_text_is_a_single_trimmed_window() {
    let splitter = RecursiveSplitter::default();
    assert_eq!(splitter.split("  Short text\n"), vec!["Short text".to_string()]);
}

#[test]
fn blank_text_yields_no_windows() {
    let splitter = RecursiveSplitter::default();
    assert!(splitter.split("").is_empty());
    assert!(splitter.split(" \n\n \n").is_empty());
}

#[test]
fn windows_respect_size_budget() {
    let text = sample_text();
    let splitter = RecursiveSplitter::new(200, 30);
    let windows = splitter.split(&text);
    assert!(windows.len() > 5);
    for w in &windows {
        assert!(w.chars().count() <= 200, "window of {} chars", w.chars().count());
    }
}

#[test]
fn windows_cover_all_text_with_only_whitespace_gaps() {
    let text = sample_text();
    for (size, overlap) in [(1000, 100), (200, 30), (64, 10)] {
        let windows = RecursiveSplitter::new(size, overlap).split(&text);
        let ranges = covered_ranges(&text, &windows);

        let mut covered_to = 0usize;
        for (start, end) in ranges {
            if start > covered_to {
                assert!(text[covered_to..start].trim().is_empty(), "gap {:?} dropped text", &text[covered_to..start]);
            }
            covered_to = covered_to.max(end);
        }
        assert!(text[covered_to..].trim().is_empty(), "tail not covered");
    }
}

#[test]
fn consecutive_windows_share_at_most_the_overlap() {
    let text = sample_text();
    let windows = RecursiveSplitter::new(200, 30).split(&text);
    let ranges = covered_ranges(&text, &windows);
    for pair in ranges.windows(2) {
        let (_, prev_end) = pair[0];
        let (next_start, _) = pair[1];
        if next_start < prev_end {
            assert!(prev_end - next_start <= 30, "overlap {} exceeds budget", prev_end - next_start);
        }
    }
}

#[test]
fn oversized_token_falls_back_to_character_windows() {
    let token: String = (0..2500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let windows = RecursiveSplitter::new(1000, 100).split(&token);

    let lens: Vec<usize> = windows.iter().map(|w| w.chars().count()).collect();
    assert_eq!(lens, vec![1000, 1000, 700]);

    let mut rebuilt = windows[0].clone();
    for w in &windows[1..] {
        assert_eq!(&w[..100], &rebuilt[rebuilt.len() - 100..]);
        rebuilt.push_str(&w[100..]);
    }
    assert_eq!(rebuilt, token);
}

#[test]
fn counts_characters_not_bytes() {
    let text = "é".repeat(150);
    let windows = RecursiveSplitter::new(100, 10).split(&text);
    assert!(windows.iter().all(|w| w.chars().count() <= 100));
    assert_eq!(windows[0].chars().count(), 100);
}

#[test]
fn single_character_budget_drops_whitespace_windows() {
    let windows = RecursiveSplitter::new(1, 0).split("a b");
    assert_eq!(windows, vec!["a".to_string(), "b".to_string()]);
    assert!(windows.iter().all(|w| !w.trim().is_empty()));
}
