//! Markup builders for rendered review widget snapshots.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use review_harvester_lib::crawling::CrawlOrchestrator;
use review_harvester_lib::domain::CrawlConfig;
use review_harvester_lib::infrastructure::parsing::ParsingConfig;
use review_harvester_lib::infrastructure::{SnapshotPage, TimingConfig};
use url::Url;

pub const LOCATION: &str = "https://shop.example/products/widget-i42.html";

pub const FILLED_STAR: &str = "//img.example/TB19ZvEgfDH8KJjy1XcXXcpdXXa-64-64.png";
pub const EMPTY_STAR: &str = "//img.example/TB18ZvEgfDH8KJjy1XcXXcpdXXa-64-64.png";

#[derive(Debug, Clone, Default)]
pub struct Review {
    pub user: String,
    pub date: String,
    pub content: String,
    pub stars: usize,
    pub likes: Option<u32>,
    pub verified: bool,
    pub photos: Vec<String>,
}

impl Review {
    pub fn new(user: &str, date: &str, content: &str) -> Self {
        Self {
            user: user.into(),
            date: date.into(),
            content: content.into(),
            stars: 5,
            ..Self::default()
        }
    }

    pub fn stars(mut self, stars: usize) -> Self {
        self.stars = stars;
        self
    }

    pub fn likes(mut self, likes: u32) -> Self {
        self.likes = Some(likes);
        self
    }

    pub fn photo(mut self, src: &str) -> Self {
        self.photos.push(src.into());
        self
    }

    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    fn render(&self) -> String {
        let glyphs: String = (0..5)
            .map(|i| {
                let src = if i < self.stars { FILLED_STAR } else { EMPTY_STAR };
                format!(r#"<img class="star" src="{src}">"#)
            })
            .collect();
        let badge = if self.verified {
            r#"<span class="verify"><img class="verifyImg" src="/verify.png">Verified Purchase</span>"#
        } else {
            ""
        };
        let photos: String = self
            .photos
            .iter()
            .map(|src| format!(r#"<img class="review-image" src="{src}">"#))
            .collect();
        let likes = self
            .likes
            .map(|n| format!(r#"<span>Helpful</span><span>{n}</span>"#))
            .unwrap_or_default();
        format!(
            r#"<div class="item">
  <div class="top"><div class="container-star">{glyphs}</div><span class="title right">{date}</span></div>
  <div class="middle"><span>{user}</span>{badge}</div>
  <div class="item-content"><div class="content">{content}</div><div class="skuInfo">Color: Black</div>{photos}</div>
  <div class="bottom"><div class="left"><div class="left-content">{likes}</div></div></div>
</div>"#,
            date = self.date,
            user = self.user,
            content = self.content,
        )
    }
}

/// One rendered page of the review widget.
pub fn page(current: u32, visible_pages: &[u32], next_disabled: bool, reviews: &[Review]) -> String {
    let items: String = reviews.iter().map(Review::render).collect();
    let controls: String = visible_pages
        .iter()
        .map(|n| {
            let class = if *n == current { " current" } else { "" };
            format!(r#"<li class="next-pagination-item{class}">{n}</li>"#)
        })
        .collect();
    let next = if next_disabled {
        r#"<button class="next-pagination-item next" disabled>Next</button>"#
    } else {
        r#"<button class="next-pagination-item next">Next</button>"#
    };
    format!(
        r#"<!DOCTYPE html><html><body>
<div class="mod-reviews">{items}</div>
<div class="review-pagination">
  <ul class="next-pagination-list"><li class="next-pagination-item prev">Prev</li>{controls}</ul>
  {next}
</div>
</body></html>"#
    )
}

/// A widget with `total` pages of `per_page` distinct reviews each.
pub fn widget(total: u32, per_page: usize) -> Vec<String> {
    (1..=total)
        .map(|n| {
            let reviews: Vec<Review> = (0..per_page)
                .map(|i| Review::new(&format!("user{n}-{i}"), "1 Jan 2024", &format!("page {n} review {i}")))
                .collect();
            let visible: Vec<u32> = (1..=total).collect();
            page(n, &visible, n == total, &reviews)
        })
        .collect()
}

pub fn location() -> Url {
    Url::parse(LOCATION).expect("valid test location")
}

pub fn snapshot_page(snapshots: Vec<String>) -> SnapshotPage {
    SnapshotPage::new(location(), snapshots).with_render_latency(Duration::from_millis(400))
}

pub fn timing() -> TimingConfig {
    TimingConfig {
        change_timeout_ms: 2000,
        ..TimingConfig::default()
    }
}

pub fn orchestrator(page: &SnapshotPage) -> CrawlOrchestrator {
    CrawlOrchestrator::new(Arc::new(page.clone()), &ParsingConfig::default(), timing())
        .expect("default page contract compiles")
}

pub fn crawl_config() -> CrawlConfig {
    CrawlConfig::default()
}
