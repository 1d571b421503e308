//! Explorer-style "logical" name ordering.
//!
//! On Windows the shell's own `StrCmpLogicalW` decides.  Elsewhere
//! [`compare_natural`] approximates it: letters compare without case and
//! runs of ASCII digits compare by numeric value, so `file2` sorts before
//! `file10`.  Names that compare equal fall back to a plain comparison to
//! keep the order total.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        // "01" after "1"
        .then_with(|| a.len().cmp(&b.len()))
}

#[cfg(windows)]
pub fn compare_logical(a: &str, b: &str) -> Ordering {
    use windows::core::PCWSTR;
    use windows::Win32::UI::Shell::StrCmpLogicalW;

    let wide_a = crate::win32::wide_str(a);
    let wide_b = crate::win32::wide_str(b);
    let shell = unsafe { StrCmpLogicalW(PCWSTR(wide_a.as_ptr()), PCWSTR(wide_b.as_ptr())) };
    shell.cmp(&0).then_with(|| a.cmp(b))
}

#[cfg(not(windows))]
pub fn compare_logical(a: &str, b: &str) -> Ordering {
    compare_natural(a, b)
}

/// Portable natural ordering.
pub fn compare_natural(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                match compare_digit_runs(&l_run, &r_run) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}
