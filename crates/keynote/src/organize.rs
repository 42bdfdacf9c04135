//! Turning recovered Keynote text into slides.

use deck_core::config::Labels;
use deck_core::{RunSignals, Slide, SlideBuilder, TitleClassifier};

/// One slide per automation item.
///
/// The item's first line is the title when the classifier accepts it as a
/// leading short line; an item with no text becomes a slide titled with the
/// numbered empty-slide label.
pub fn slides_from_items(items: &[String], classifier: &TitleClassifier, labels: &Labels) -> Vec<Slide> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let lines: Vec<String> = deck_core::text::split_paragraphs(item);
            let Some((first, rest)) = lines.split_first() else {
                return Slide::new(Some(labels.empty_slide_title(i + 1)), Vec::new());
            };

            let mut builder = SlideBuilder::new(classifier);
            builder.push(&RunSignals::plain(first.as_str(), 0));
            if !rest.is_empty() {
                builder.push(&RunSignals::plain(rest.join("\n"), 1));
            }
            builder.build()
        })
        .collect()
}

/// Group loose text runs from an archive scan into slides.
///
/// A short run opens a slide as its title; a slide closes once it holds
/// `per_slide` body runs. When that yields fewer than `min_slides` slides,
/// the runs are regrouped in fixed chunks of `per_slide`, each chunk led by
/// its first run (as title when short).
pub fn group_runs(runs: &[String], classifier: &TitleClassifier, per_slide: usize, min_slides: usize) -> Vec<Slide> {
    let per_slide = per_slide.max(1);
    let is_title = |text: &str| classifier.classify(&RunSignals::plain(text, 0)).is_title();

    let mut slides = Vec::new();
    let mut current = Slide::default();
    for run in runs {
        if current.title.is_none() && is_title(run) {
            current.title = Some(run.clone());
            continue;
        }
        current.body.push(run.clone());
        if current.body.len() >= per_slide {
            slides.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        slides.push(current);
    }

    if slides.len() >= min_slides {
        return slides;
    }

    log::debug!(
        "{} slides from grouping, regrouping {} runs in chunks of {}",
        slides.len(),
        runs.len(),
        per_slide
    );
    runs.chunks(per_slide)
        .map(|chunk| {
            let (head, tail) = (&chunk[0], &chunk[1..]);
            if is_title(head) {
                Slide::new(Some(head.clone()), tail.to_vec())
            } else {
                Slide::new(None, chunk.to_vec())
            }
        })
        .collect()
}
