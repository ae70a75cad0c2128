// =============================================================================
// catalog.rs — THE GRAND REGISTRY OF PLACES A USERNAME CAN HIDE
// =============================================================================
//
// Thirty services, thirty URL templates, thirty hand-curated "this profile
// does not exist" phrases collected by staring at 404 pages so you don't
// have to. The catalog is constructed once at startup, handed to the
// dispatcher by reference, and never mutated afterwards. There is no
// runtime registration, no plugin system, no YAML. Adding a site means
// editing this file, which keeps the barrier to entry exactly where we
// want it: at code review.
//
// The not-found markers are matched case-insensitively against the body,
// so the casing below is cosmetic. The Unicode apostrophes are not —
// Twitter really does serve "doesn’t" with U+2019 and will make a fool of
// anyone who types a plain quote.
// =============================================================================

use crate::models::SiteSpec;

/// The ordered, read-only registry of target services.
///
/// Ordering matters only for determinism of dispatch (jobs are emitted in
/// catalog order); results arrive in whatever order the network feels like.
#[derive(Debug, Clone)]
pub struct Catalog {
    sites: Vec<SiteSpec>,
}

impl Catalog {
    /// Build a catalog from explicit specs. Used by tests and by anyone
    /// brave enough to point the engine at their own list.
    pub fn new(sites: Vec<SiteSpec>) -> Self {
        Self { sites }
    }

    pub fn sites(&self) -> &[SiteSpec] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// The built-in registry. Every entry is (name, template, marker);
    /// an empty marker means the verdict rides on the status code alone.
    pub fn builtin() -> Self {
        let specs: &[(&str, &str, &str)] = &[
            ("Facebook", "https://www.facebook.com/{}", "Content not available right now"),
            ("Twitter", "https://twitter.com/{}", "This account doesn’t exist"),
            ("Instagram", "https://www.instagram.com/{}/", "Sorry, this page isn't available."),
            ("GitHub", "https://github.com/{}", "Not Found"),
            ("Reddit", "https://www.reddit.com/user/{}", "page not found"),
            ("YouTube", "https://www.youtube.com/{}", "This channel does not exist."),
            ("TikTok", "https://www.tiktok.com/@{}", "Page not found"),
            ("Medium", "https://medium.com/@{}", "There is no profile for"),
            ("StackOverflow", "https://stackoverflow.com/users/{}", "Page Not Found"),
            ("LinkedIn", "https://www.linkedin.com/in/{}", "Profile not found"),
            ("Pinterest", "https://www.pinterest.com/{}/", "User not found"),
            ("Telegram", "https://t.me/{}", "User does not exist"),
            ("Snapchat", "https://www.snapchat.com/add/{}", "User not found"),
            ("Tumblr", "https://{}.tumblr.com", "There's nothing here."),
            ("Threads", "https://www.threads.net/@{}", "Sorry, this page isn't available."),
            ("Bluesky", "https://bsky.app/profile/{}", "Profile not found"),
            ("Xing", "https://www.xing.com/profile/{}", "This page is unfortunately not available."),
            ("Quora", "https://www.quora.com/profile/{}", "The page you were looking for could not be found"),
            ("Vimeo", "https://vimeo.com/{}", "404 Not Found"),
            ("Twitch", "https://www.twitch.tv/{}", "Sorry. Unless you’ve got a time machine, that content is unavailable."),
            ("SoundCloud", "https://soundcloud.com/{}", "We can't find that user."),
            ("Spotify", "https://open.spotify.com/user/{}", "Page not found"),
            ("Behance", "https://www.behance.net/{}", "Page Not Found"),
            ("Dribbble", "https://dribbble.com/{}", "Whoops, that page is gone."),
            ("ArtStation", "https://www.artstation.com/{}", "Page not found!"),
            ("DeviantArt", "https://www.deviantart.com/{}", "404 Not Found"),
            ("Flickr", "https://www.flickr.com/people/{}/", "Page not found"),
            ("GitLab", "https://gitlab.com/{}", "User not found"),
            ("Steam", "https://steamcommunity.com/id/{}", "The specified profile could not be found."),
            // Discord has no public profile page worth scraping; the verdict
            // rides on the status code alone.
            ("Discord", "https://discord.com/users/{}", ""),
        ];

        Self::new(
            specs
                .iter()
                .map(|(name, template, marker)| SiteSpec::new(*name, *template, *marker))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_not_empty() {
        assert!(Catalog::builtin().len() >= 30);
    }

    #[test]
    fn test_every_template_has_exactly_one_slot() {
        for site in Catalog::builtin().sites() {
            let slots = site.url_template.matches("{}").count();
            assert_eq!(slots, 1, "{} has {} slots", site.name, slots);
        }
    }

    #[test]
    fn test_no_duplicate_site_names() {
        let catalog = Catalog::builtin();
        let mut names: Vec<&str> = catalog.sites().iter().map(|s| s.name.as_str()).collect();
        names.sort();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }
}
