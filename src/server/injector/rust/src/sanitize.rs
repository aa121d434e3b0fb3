/* src/server/injector/rust/src/sanitize.rs */

/// Make JSON text safe to embed in an inline `<script>` block.
///
/// `<`, `>`, `&` and the JS line terminators U+2028/U+2029 are rewritten as
/// `\uXXXX` escapes. None of them can appear outside a JSON string, so the
/// output decodes to the same value and never contains `</script`.
pub fn sanitize_json(json: &str) -> String {
  let mut out = String::with_capacity(json.len());
  for ch in json.chars() {
    match ch {
      '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => {
        out.push_str(&format!("\\u{:04x}", ch as u32));
      }
      c => out.push(c),
    }
  }
  out
}
