// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2018 Philip Jenvey <pjenvey@mozilla.com>
// Copyright 2018-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// A tag as written on the wire: `key:value` when a key is present, just
/// `value` otherwise.
pub(crate) type Tag<'a> = (Option<&'a str>, &'a str);

const TAG_PREFIX: &str = "|#";

fn tag_size((key, value): &Tag<'_>) -> usize {
    key.map_or(0, |k| k.len() + 1 /* : */) + value.len()
}

/// Build the `|#tag1,tag2,...` suffix from the client-wide tags followed by
/// the call-site tags.
///
/// Tags are concatenated in that order and never deduplicated. When both
/// sets are empty the suffix is omitted entirely (an empty string).
pub(crate) fn tag_string(global: &[Tag<'_>], local: &[Tag<'_>]) -> String {
    let count = global.len() + local.len();
    if count == 0 {
        return String::new();
    }

    // prefix, keys and values, commas
    let kv_size: usize = global.iter().chain(local).map(tag_size).sum();
    let mut out = String::with_capacity(TAG_PREFIX.len() + kv_size + count - 1);

    out.push_str(TAG_PREFIX);
    for (i, &(key, value)) in global.iter().chain(local).enumerate() {
        if i > 0 {
            out.push(',');
        }
        if let Some(key) = key {
            out.push_str(key);
            out.push(':');
        }
        out.push_str(value);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::tag_string;

    #[test]
    fn test_tag_string_empty() {
        assert_eq!("", tag_string(&[], &[]));
    }

    #[test]
    fn test_tag_string_local_only() {
        let local = [(None, "tag1:test"), (None, "tag2:test2"), (None, "tag3")];
        assert_eq!("|#tag1:test,tag2:test2,tag3", tag_string(&[], &local));
    }

    #[test]
    fn test_tag_string_global_only() {
        let global = [(Some("env"), "prod")];
        assert_eq!("|#env:prod", tag_string(&global, &[]));
    }

    #[test]
    fn test_tag_string_global_then_local() {
        let global = [(None, "env:prod")];
        let local = [(Some("host"), "h1")];
        assert_eq!("|#env:prod,host:h1", tag_string(&global, &local));
    }

    #[test]
    fn test_tag_string_keeps_duplicates() {
        let global = [(None, "env:prod")];
        let local = [(None, "env:prod"), (Some("env"), "dev")];
        assert_eq!("|#env:prod,env:prod,env:dev", tag_string(&global, &local));
    }

    #[test]
    fn test_tag_string_key_value_and_value_tags() {
        let global = [(Some("host"), "app01.example.com"), (None, "beta")];
        let local = [(Some("bucket"), "A")];
        let out = tag_string(&global, &local);

        assert_eq!("|#host:app01.example.com,beta,bucket:A", out);
    }
}
