//! Page scripts run through the driver
//!
//! Selectors and marker text are passed as script arguments, never spliced
//! into the source.

/// Returns `document.readyState`
pub const READY_STATE: &str = "return document.readyState;";

/// `arguments[0]`: marker text. Returns whether a displayed element contains it.
pub const NO_DATA_VISIBLE: &str = r"
const needle = arguments[0];
if (!document.body) { return false; }
const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT);
while (walker.nextNode()) {
  const node = walker.currentNode;
  if (!node.nodeValue || !node.nodeValue.includes(needle)) { continue; }
  const el = node.parentElement;
  if (!el) { continue; }
  const style = window.getComputedStyle(el);
  const rect = el.getBoundingClientRect();
  if (style.display !== 'none' && style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0) {
    return true;
  }
}
return false;
";

/// Returns `null` without a chart, otherwise whether every series is empty
pub const SERIES_EMPTY: &str = r"
if (typeof Highcharts === 'undefined' || !Highcharts.charts) { return null; }
const chart = Highcharts.charts[0];
if (!chart) { return null; }
const series = chart.series || [];
return series.every(s => !s.points || s.points.length === 0);
";

/// `arguments[0]`: series selector. Returns the count of displayed matches.
pub const VISIBLE_COUNT: &str = r"
return Array.from(document.querySelectorAll(arguments[0])).filter(el => {
  const style = window.getComputedStyle(el);
  const rect = el.getBoundingClientRect();
  return style.display !== 'none' && style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0;
}).length;
";

/// `arguments[0]`: container selector. Returns viewport rects in document order.
pub const CONTAINER_RECTS: &str = r"
return Array.from(document.querySelectorAll(arguments[0])).map(el => {
  const r = el.getBoundingClientRect();
  return { x: r.left, y: r.top, width: r.width, height: r.height };
});
";

/// `arguments[0]`: container selector, `arguments[1]`: index.
/// Scrolls the container into view and returns its new rect, or `null`.
pub const FOCUS_CONTAINER: &str = r"
const el = document.querySelectorAll(arguments[0])[arguments[1]];
if (!el) { return null; }
el.scrollIntoView({ block: 'start', inline: 'nearest' });
const r = el.getBoundingClientRect();
return { x: r.left, y: r.top, width: r.width, height: r.height };
";
