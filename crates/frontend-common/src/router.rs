//! Route table
//!
//! Static path to page mapping. Path parameters are handed to the page as-is;
//! there are no guards or redirects at this layer.

use serde::Serialize;
use std::fmt;
use yew_router::Routable;

#[derive(Debug, Clone, PartialEq, Eq, Routable)]
pub enum Route {
    #[at("/")]
    Landing,
    #[at("/market")]
    Market,
    #[at("/generate")]
    PromptGenerate,
    #[at("/avatars/:id")]
    AvatarDetail { id: String },
    #[at("/my/generations")]
    MyGenerations,
    #[at("/influencer/dashboard")]
    InfluencerDashboard,
}

/// Page component a route renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Page {
    Landing,
    Market,
    PromptGeneration,
    Generation,
    MyGenerations,
    InfluencerDashboard,
}

impl Page {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landing => "Landing",
            Self::Market => "Market",
            Self::PromptGeneration => "PromptGeneration",
            Self::Generation => "Generation",
            Self::MyGenerations => "MyGenerations",
            Self::InfluencerDashboard => "InfluencerDashboard",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub path: &'static str,
    pub name: &'static str,
    pub page: Page,
}

/// Every route, in declaration order
pub const ROUTES: &[RouteEntry] = &[
    RouteEntry {
        path: "/",
        name: "landing",
        page: Page::Landing,
    },
    RouteEntry {
        path: "/market",
        name: "market",
        page: Page::Market,
    },
    RouteEntry {
        path: "/generate",
        name: "prompt-generate",
        page: Page::PromptGeneration,
    },
    RouteEntry {
        path: "/avatars/:id",
        name: "avatar-detail",
        page: Page::Generation,
    },
    RouteEntry {
        path: "/my/generations",
        name: "my-generations",
        page: Page::MyGenerations,
    },
    RouteEntry {
        path: "/influencer/dashboard",
        name: "influencer-dashboard",
        page: Page::InfluencerDashboard,
    },
];

impl Route {
    /// Match a location path, `None` when nothing is mounted there
    pub fn resolve(path: &str) -> Option<Self> {
        Self::recognize(path)
    }

    pub fn entry(&self) -> &'static RouteEntry {
        let index = match self {
            Self::Landing => 0,
            Self::Market => 1,
            Self::PromptGenerate => 2,
            Self::AvatarDetail { .. } => 3,
            Self::MyGenerations => 4,
            Self::InfluencerDashboard => 5,
        };
        &ROUTES[index]
    }

    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    pub fn page(&self) -> Page {
        self.entry().page
    }
}
