use crate::histogram::Histogram;

/// Chart points for the two groups, one per bin at the bin midpoint
pub fn group_series(histogram: &Histogram) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    histogram
        .bins
        .iter()
        .map(|b| {
            let mid = (b.lo + b.hi) / 2.0;
            ((mid, b.diagnosed), (mid, b.control))
        })
        .unzip()
}

/// X and Y bounds for the distribution chart, widened to include `marker`
pub fn compute_chart_bounds(histogram: &Histogram, marker: Option<f64>) -> ([f64; 2], [f64; 2]) {
    let mut lo = histogram.bins.first().map_or(0.0, |b| b.lo);
    let mut hi = histogram.bins.last().map_or(1.0, |b| b.hi);
    if let Some(m) = marker {
        lo = lo.min(m);
        hi = hi.max(m);
    }
    if hi <= lo {
        hi = lo + 1.0;
    }

    let top = histogram.max_height();
    let top = if top > 0.0 { top } else { 1.0 };
    ([lo, hi], [0.0, top])
}

/// Vertical line at the user's speed, spanning the chart height
pub fn marker_line(wpm: f64, top: f64) -> Vec<(f64, f64)> {
    vec![(wpm, 0.0), (wpm, top)]
}

/// Outline of the bin holding `wpm`, drawn up to the taller of its two groups
pub fn highlighted_bin(histogram: &Histogram, wpm: f64) -> Vec<(f64, f64)> {
    let Some(bin) = histogram.bin_of(wpm).and_then(|i| histogram.bins.get(i)) else {
        return vec![];
    };
    let top = bin.diagnosed.max(bin.control);
    vec![(bin.lo, 0.0), (bin.lo, top), (bin.hi, top), (bin.hi, 0.0)]
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
