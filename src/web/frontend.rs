//! Embedded HTML/CSS/JS for the floorview landing page.
//!
//! The index is compiled into the binary as a string constant. It links to
//! every dashboard page and polls the JSON API for render stats and health.

/// The landing page HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>floorview</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

header {
  border-bottom: 1px solid var(--border);
  padding: 16px 24px;
}
header h1 { font-size: 20px; font-weight: 600; }
header h1 span { color: var(--accent); }

main { max-width: 1100px; margin: 0 auto; padding: 24px; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }

.pages { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 12px; }
.pages a {
  display: block;
  padding: 14px;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  color: var(--accent);
  text-decoration: none;
  font-weight: 600;
}
.pages a:hover { background: rgba(255,255,255,0.04); }

.stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; }
.stat { text-align: center; }
.stat .value { font-size: 28px; font-weight: 700; font-family: var(--mono); color: var(--accent); }
.stat .label { font-size: 12px; color: var(--text-muted); text-transform: uppercase; letter-spacing: 0.5px; }

table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { text-align: left; padding: 8px 10px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 600; }
.mono { font-family: var(--mono); }
.ok { color: var(--green); }
.bad { color: var(--red); }
.muted { color: var(--text-muted); }
</style>
</head>
<body>
<header><h1><span>floorview</span> shop-floor dashboards</h1></header>
<main>
  <section class="card">
    <h2>Dashboards</h2>
    <div class="pages">
      <a href="/machines/all">Machine Status</a>
      <a href="/machines/lathes-millturn">Lathes &amp; Millturn</a>
      <a href="/machines/mill45ax">4 &amp; 5 Axis Mills</a>
      <a href="/machines/grinding">Grinding</a>
      <a href="/wip">Work in Progress</a>
      <a href="/quality">Quality</a>
      <a href="/mrb">MRB</a>
    </div>
  </section>

  <section class="card">
    <h2>Renders (last 7 days)</h2>
    <div class="stats-grid">
      <div class="stat"><div class="value" id="total">-</div><div class="label">Renders</div></div>
      <div class="stat"><div class="value" id="failures">-</div><div class="label">Failures</div></div>
      <div class="stat"><div class="value" id="success">-</div><div class="label">Success</div></div>
      <div class="stat"><div class="value" id="duration">-</div><div class="label">Avg ms</div></div>
    </div>
    <table style="margin-top:16px">
      <thead><tr><th>Page</th><th>Renders</th><th>Failures</th><th>Avg rows</th><th>Last render</th><th>Last error</th></tr></thead>
      <tbody id="page-stats"><tr><td colspan="6" class="muted">Loading...</td></tr></tbody>
    </table>
  </section>

  <section class="card">
    <h2>Sources</h2>
    <table>
      <thead><tr><th>Source</th><th>Location</th><th>Status</th></tr></thead>
      <tbody id="sources"><tr><td colspan="3" class="muted">Loading...</td></tr></tbody>
    </table>
  </section>
</main>

<script>
function esc(s) {
  const d = document.createElement('div');
  d.textContent = s == null ? '' : String(s);
  return d.innerHTML;
}

async function loadStats() {
  const res = await fetch('/api/stats?days=7');
  const s = await res.json();
  document.getElementById('total').textContent = s.total_renders;
  document.getElementById('failures').textContent = s.failures;
  document.getElementById('success').textContent = s.success_pct.toFixed(1) + '%';
  document.getElementById('duration').textContent = Math.round(s.avg_duration_ms);

  const rows = s.page_stats.map(p =>
    '<tr><td>' + esc(p.page) + '</td>' +
    '<td class="mono">' + p.renders + '</td>' +
    '<td class="mono ' + (p.failures ? 'bad' : '') + '">' + p.failures + '</td>' +
    '<td class="mono">' + p.avg_rows.toFixed(1) + '</td>' +
    '<td class="mono muted">' + esc(p.last_render) + '</td>' +
    '<td class="bad">' + esc(p.last_error) + '</td></tr>');
  document.getElementById('page-stats').innerHTML =
    rows.join('') || '<tr><td colspan="6" class="muted">No renders yet.</td></tr>';
}

async function loadHealth() {
  const res = await fetch('/api/health');
  const h = await res.json();
  document.getElementById('sources').innerHTML = h.sources.map(s =>
    '<tr><td>' + esc(s.name) + '</td>' +
    '<td class="mono">' + esc(s.location) + '</td>' +
    '<td class="' + (s.reachable ? 'ok">reachable' : 'bad">unreachable') + '</td></tr>').join('');
}

loadStats().catch(() => {});
loadHealth().catch(() => {});
setInterval(() => loadStats().catch(() => {}), 30000);
</script>
</body>
</html>
"##;
