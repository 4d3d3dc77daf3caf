//! Standalone HTML page around a rendered diagram
//!
//! The optional inline script wires label clicks to collapse/expand in the browser,
//! reading the `data-toggle`, `data-node` and `data-summary` markers the scene emits.

use crate::infrastructure::svg::escape_xml;

const TOGGLE_SCRIPT: &str = r#"<script>
(function () {
  var duration = __DURATION__;
  var root = document.getElementById(__CONTAINER__);
  function fade(els, from, to, done) {
    els.forEach(function (el) { el.style.transition = 'none'; el.style.opacity = from; });
    requestAnimationFrame(function () {
      els.forEach(function (el) {
        el.style.transition = 'opacity ' + duration + 'ms ease-out';
        el.style.opacity = to;
      });
      setTimeout(done, duration);
    });
  }
  root.querySelectorAll('[data-toggle]').forEach(function (label) {
    label.addEventListener('click', function () {
      var group = root.querySelector('g[data-node="' + label.getAttribute('data-toggle') + '"]');
      if (!group || group.dataset.busy) { return; }
      var kids = Array.prototype.filter.call(group.children, function (el) { return el.tagName === 'g'; });
      var summary = group.querySelector(':scope > [data-summary]');
      var collapsing = summary.getAttribute('display') === 'none';
      var outgoing = collapsing ? kids : [summary];
      var incoming = collapsing ? [summary] : kids;
      group.dataset.busy = '1';
      fade(outgoing, 1, 0, function () {
        outgoing.forEach(function (el) { el.setAttribute('display', 'none'); });
        incoming.forEach(function (el) { el.removeAttribute('display'); });
        fade(incoming, 0, 1, function () { delete group.dataset.busy; });
      });
    });
  });
})();
</script>"#;

/// Wrap `svg` in an HTML document, mounting it in a `div` with id `container`.
///
/// With `interactive`, a toggle script with the given fade duration is embedded.
pub fn render_page(title: &str, container: &str, svg: &str, interactive: bool, duration_ms: u64) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{}</title>\n", escape_xml(title)));
    page.push_str("</head>\n<body>\n");
    page.push_str(&format!("<div id=\"{}\">\n{}\n</div>\n", escape_xml(container), svg));
    if interactive {
        let script = TOGGLE_SCRIPT
            .replace("__DURATION__", &duration_ms.to_string())
            .replace("__CONTAINER__", &js_string(container));
        page.push_str(&script);
        page.push('\n');
    }
    page.push_str("</body>\n</html>\n");
    page
}

/// Encode `value` as a JavaScript string literal safe inside a `<script>` element.
fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}
