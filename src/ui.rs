pub fn render_index(title: &str, refresh_ms: u128) -> String {
    INDEX_HTML
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{REFRESH_MS}}", &refresh_ms.to_string())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(980px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
      font-size: 1rem;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .chart-area {
      display: grid;
      gap: 12px;
    }

    .chart-area h2 {
      margin: 0;
      font-size: 1.4rem;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    svg.chart {
      width: 100%;
      height: 300px;
      display: block;
    }

    svg.chart text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .chart-line {
      fill: none;
      stroke-width: 3;
    }

    .chart-point {
      fill: white;
      stroke-width: 2;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      font-size: 0.9rem;
    }

    .legend span::before {
      content: "";
      display: inline-block;
      width: 12px;
      height: 12px;
      border-radius: 50%;
      margin-right: 6px;
      background: var(--swatch);
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>{{TITLE}}</h1>
      <p class="subtitle">Seats as the count progresses, compared with the baseline election.</p>
    </header>
    <section class="panel">
      <div class="stat"><span class="label">Counted</span><span class="value" id="counted">--</span></div>
      <div class="stat"><span class="label">Turnout</span><span class="value" id="turnout">--</span></div>
      <div class="stat"><span class="label">Seats assigned</span><span class="value" id="seats">--</span></div>
      <div class="stat"><span class="label">Snapshots</span><span class="value" id="snapshots">0</span></div>
    </section>
    <section class="chart-area">
      <h2>Seats per party</h2>
      <div class="chart-card"><svg class="chart" id="chart-parties" viewBox="0 0 760 300" role="img"></svg></div>
      <div class="legend" id="legend-parties"></div>
    </section>
    <section class="chart-area">
      <h2>Seats per bloc</h2>
      <div class="chart-card"><svg class="chart" id="chart-blocs" viewBox="0 0 760 300" role="img"></svg></div>
      <div class="legend" id="legend-blocs"></div>
    </section>
    <div class="status" id="status"></div>
  </main>
  <script>
    const REFRESH_MS = {{REFRESH_MS}};
    const COLORS = ['#ff6b4a', '#2f4858', '#33658a', '#86bbd8', '#f6ae2d', '#758e4f', '#9b5de5', '#c63b2b', '#2d7a4b'];
    const statusEl = document.getElementById('status');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const formatNumber = (value, suffix = '') => {
      if (typeof value !== 'number' || Number.isNaN(value)) {
        return '--';
      }
      const rounded = Math.round(value * 100) / 100;
      return `${rounded}${suffix}`;
    };

    const escapeText = (text) => String(text)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;');

    const groupSeries = (rows, key) => {
      const times = [];
      const series = new Map();
      rows.forEach((row) => {
        times[row.snapshot] = row.time;
        if (!series.has(row[key])) {
          series.set(row[key], []);
        }
        series.get(row[key]).push({ snapshot: row.snapshot, seats: row.seats, baseline: row.baseline });
      });
      return { times, series };
    };

    const renderChart = (svgId, legendId, rows, key) => {
      const chartEl = document.getElementById(svgId);
      const legendEl = document.getElementById(legendId);
      const { times, series } = groupSeries(rows, key);
      if (!times.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
        legendEl.innerHTML = '';
        return;
      }

      const width = 760;
      const height = 300;
      const paddingX = 44;
      const paddingY = 34;
      const top = 20;
      const max = Math.max(1, ...rows.map((row) => Math.max(row.seats, row.baseline)));
      const xStep = times.length > 1 ? (width - paddingX * 2) / (times.length - 1) : 0;
      const scaleY = (height - top - paddingY) / max;
      const x = (snapshot) => paddingX + snapshot * xStep;
      const y = (value) => height - paddingY - value * scaleY;

      let grid = '';
      const ticks = 4;
      for (let i = 0; i <= ticks; i += 1) {
        const value = (max * i) / ticks;
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${y(value)}" x2="${width - paddingX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${paddingX - 10}" y="${y(value) + 4}" text-anchor="end">${Math.round(value)}</text>`;
      }

      const labelEvery = Math.max(1, Math.ceil(times.length / 8));
      const xLabels = times
        .map((time, i) => (i % labelEvery === 0
          ? `<text class="chart-label" x="${x(i)}" y="${height - paddingY + 18}" text-anchor="middle">${escapeText(time.slice(11, 16))}</text>`
          : ''))
        .join('');

      let lines = '';
      let legend = '';
      Array.from(series.entries()).forEach(([name, points], i) => {
        const color = COLORS[i % COLORS.length];
        const path = points
          .map((point, j) => `${j === 0 ? 'M' : 'L'} ${x(point.snapshot).toFixed(2)} ${y(point.seats).toFixed(2)}`)
          .join(' ');
        lines += `<path class="chart-line" stroke="${color}" d="${path}" />`;
        lines += points
          .map((point) => `<circle class="chart-point" stroke="${color}" cx="${x(point.snapshot)}" cy="${y(point.seats)}" r="3"><title>${escapeText(name)}: ${point.seats} seats (baseline ${point.baseline})</title></circle>`)
          .join('');
        legend += `<span style="--swatch:${color}">${escapeText(name)}</span>`;
      });

      chartEl.innerHTML = `${grid}${lines}${xLabels}`;
      legendEl.innerHTML = legend;
    };

    const updateStatus = (data) => {
      const status = data.status;
      document.getElementById('counted').textContent = formatNumber(status.perc_counted_votes, '%');
      document.getElementById('turnout').textContent = formatNumber(status.turnout, '%');
      document.getElementById('seats').textContent = status.total_seats == null
        ? '--'
        : `${formatNumber(status.seats_assigned)} / ${formatNumber(status.total_seats)}`;
      document.getElementById('snapshots').textContent = status.snapshots;
      const last = status.last_retrieval ? `Last update ${status.last_retrieval} UTC.` : 'No snapshots yet.';
      if (data.stale) {
        setStatus(`${last} History file unreadable, showing previous data.`, 'error');
      } else {
        setStatus(last, '');
      }
    };

    const refresh = async () => {
      const res = await fetch('/api/dashboard');
      if (!res.ok) {
        throw new Error('Unable to load results');
      }
      const data = await res.json();
      updateStatus(data);
      renderChart('chart-parties', 'legend-parties', data.parties, 'party');
      renderChart('chart-blocs', 'legend-blocs', data.blocs, 'bloc');
    };

    const tick = () => refresh().catch((err) => setStatus(err.message, 'error'));
    tick();
    setInterval(tick, REFRESH_MS);
  </script>
</body>
</html>
"#;
