use super::profile::{Availability, Profile, Project};

struct DemoProfile {
    id: u32,
    name: &'static str,
    location: &'static str,
    availability: Availability,
    bio: &'static str,
    tech_stack: &'static [&'static str],
    projects: &'static [(&'static str, &'static str, &'static [&'static str])],
}

const DEMO_PROFILES: &[DemoProfile] = &[
    DemoProfile {
        id: 1,
        name: "Yuki Tanaka",
        location: "Tokyo",
        availability: Availability::Available,
        bio: "Full-stack developer building high-performance web apps in Rust and WebAssembly.",
        tech_stack: &["Rust", "React", "WebAssembly", "Docker"],
        projects: &[
            ("Real-time Chat Engine", "10k+ concurrent users under 50ms", &["Rust", "WebAssembly", "React"]),
            ("WASM Image Processor", "50k+ npm downloads", &["Rust", "WebAssembly", "TypeScript"]),
        ],
    },
    DemoProfile {
        id: 2,
        name: "Sakura Yamamoto",
        location: "Osaka",
        availability: Availability::Available,
        bio: "ML engineer focused on computer vision and edge AI.",
        tech_stack: &["ML", "Python", "TensorFlow", "Docker"],
        projects: &[
            ("Real-time Object Detection", "Deployed in 3 production apps", &["Python", "TensorFlow", "ML"]),
            ("Dataset Augmentation Tool", "2k+ GitHub stars", &["Python", "ML", "Docker"]),
        ],
    },
    DemoProfile {
        id: 3,
        name: "Kenji Sato",
        location: "Tokyo",
        availability: Availability::Open,
        bio: "Infrastructure engineer working on cloud-native platforms.",
        tech_stack: &["Go", "Kubernetes", "AWS", "Docker"],
        projects: &[
            ("K8s Auto-Scaler", "Cut cloud costs by 40%", &["Go", "Kubernetes", "AWS"]),
            ("Multi-Cloud Deployer", "Used by 12 teams", &["Go", "AWS", "GCP", "Docker"]),
        ],
    },
    DemoProfile {
        id: 4,
        name: "Aiko Nakamura",
        location: "Kyoto",
        availability: Availability::Available,
        bio: "Frontend engineer who loves design systems.",
        tech_stack: &["React", "TypeScript", "Node", "GraphQL"],
        projects: &[
            ("Component Library", "Adopted by 4 product teams", &["React", "TypeScript"]),
            ("GraphQL Gateway", "Halved API round trips", &["TypeScript", "GraphQL", "Node"]),
        ],
    },
    DemoProfile {
        id: 5,
        name: "Hiroshi Takahashi",
        location: "Tokyo",
        availability: Availability::NotLooking,
        bio: "Smart-contract auditor and systems programmer.",
        tech_stack: &["Rust", "Blockchain", "Solidity", "Node"],
        projects: &[("DeFi Audit Toolkit", "Found 30+ critical bugs", &["Rust", "Blockchain"])],
    },
    DemoProfile {
        id: 6,
        name: "Mei Chen",
        location: "Tokyo",
        availability: Availability::Available,
        bio: "Product-minded engineer shipping data-heavy dashboards.",
        tech_stack: &["React", "Python", "PostgreSQL", "AWS"],
        projects: &[
            ("Clinic Booking Platform", "2k bookings per week", &["React", "Python", "PostgreSQL"]),
            ("Analytics Dashboard", "Replaced 6 spreadsheets", &["React", "Python"]),
        ],
    },
    DemoProfile {
        id: 7,
        name: "Ryo Suzuki",
        location: "Fukuoka",
        availability: Availability::Open,
        bio: "Mobile developer building offline-first apps.",
        tech_stack: &["Flutter", "Dart", "Firebase", "Node"],
        projects: &[("Plant Identifier", "40k installs", &["Flutter", "Firebase", "ML"])],
    },
    DemoProfile {
        id: 8,
        name: "Emi Watanabe",
        location: "Tokyo",
        availability: Availability::Available,
        bio: "Backend engineer obsessed with latency budgets.",
        tech_stack: &["Go", "Kubernetes", "PostgreSQL", "Redis"],
        projects: &[
            ("Rate Limiter Service", "Serves 1M req/min", &["Go", "Redis"]),
            ("Job Queue", "Zero lost jobs in a year", &["Go", "Redis", "Docker"]),
        ],
    },
    DemoProfile {
        id: 9,
        name: "Takeshi Ito",
        location: "Sapporo",
        availability: Availability::Available,
        bio: "Bootcamp graduate automating data pipelines.",
        tech_stack: &["Python", "PostgreSQL", "AWS", "Docker"],
        projects: &[("Streaming ETL", "Processes 5GB daily", &["Python", "PostgreSQL", "AWS"])],
    },
    DemoProfile {
        id: 10,
        name: "Yui Kobayashi",
        location: "Tokyo",
        availability: Availability::Open,
        bio: "Full-stack TypeScript developer dabbling in Rust.",
        tech_stack: &["TypeScript", "Node", "React", "Rust"],
        projects: &[
            ("CLI Scaffolder", "3k weekly downloads", &["TypeScript", "Node"]),
            ("Native Addon Toolkit", "Used by 2 startups", &["Rust", "Node", "TypeScript"]),
        ],
    },
    DemoProfile {
        id: 11,
        name: "Daiki Yamada",
        location: "Nagoya",
        availability: Availability::Available,
        bio: "iOS developer with a soft spot for animation.",
        tech_stack: &["Swift", "iOS", "Firebase", "GraphQL"],
        projects: &[("Habit Tracker", "4.8 App Store rating", &["Swift", "Firebase", "GraphQL"])],
    },
    DemoProfile {
        id: 12,
        name: "Hana Fujimoto",
        location: "Tokyo",
        availability: Availability::Available,
        bio: "DevOps engineer turning click-ops into code.",
        tech_stack: &["AWS", "Terraform", "Docker", "Python"],
        projects: &[("Infra Blueprints", "Provisioned 80 environments", &["Terraform", "AWS", "Docker"])],
    },
    DemoProfile {
        id: 13,
        name: "Sora Kim",
        location: "Tokyo",
        availability: Availability::Open,
        bio: "Game developer bringing 3D to the browser.",
        tech_stack: &["WebGL", "Unity", "CSharp", "Node"],
        projects: &[("Multiplayer Sandbox", "10k monthly players", &["Unity", "WebGL", "Node"])],
    },
    DemoProfile {
        id: 14,
        name: "Kaito Matsumoto",
        location: "Osaka",
        availability: Availability::Available,
        bio: "API designer and GraphQL enthusiast.",
        tech_stack: &["Node", "GraphQL", "PostgreSQL", "Docker"],
        projects: &[
            ("Marketplace API", "Powers 3 storefronts", &["Node", "GraphQL", "Redis"]),
            ("Schema Linter", "Open-sourced, 600 stars", &["Node", "GraphQL"]),
        ],
    },
    DemoProfile {
        id: 15,
        name: "Rina Tanaka",
        location: "Tokyo",
        availability: Availability::Available,
        bio: "Creative developer mixing React and 3D.",
        tech_stack: &["React", "TypeScript", "ThreeJS", "WebGL"],
        projects: &[("Interactive Museum Tour", "Featured by a national museum", &["React", "WebGL"])],
    },
    DemoProfile {
        id: 16,
        name: "Shun Nakano",
        location: "Fukuoka",
        availability: Availability::NotLooking,
        bio: "Scripting everything between Python and Go.",
        tech_stack: &["Python", "Go", "Docker", "AWS"],
        projects: &[("Log Shipper", "Handles 200 hosts", &["Python", "Go", "Docker"])],
    },
    DemoProfile {
        id: 17,
        name: "Mio Hayashi",
        location: "Tokyo",
        availability: Availability::Available,
        bio: "Junior developer who ships Vue apps fast.",
        tech_stack: &["Vue", "Ruby", "PostgreSQL", "AWS"],
        projects: &[
            ("Recipe Planner", "1k weekly users", &["Vue", "Ruby", "PostgreSQL"]),
            ("Volunteer Scheduler", "Used by 5 NPOs", &["Vue", "Ruby"]),
        ],
    },
    DemoProfile {
        id: 18,
        name: "Haruto Ishikawa",
        location: "Tokyo",
        availability: Availability::Open,
        bio: "Android developer experimenting with on-device ML.",
        tech_stack: &["Kotlin", "Android", "Firebase", "GraphQL"],
        projects: &[("Receipt Scanner", "95% OCR accuracy", &["Kotlin", "Android", "ML"])],
    },
    DemoProfile {
        id: 19,
        name: "Nana Yoshida",
        location: "Kyoto",
        availability: Availability::Available,
        bio: "Research engineer training small language models.",
        tech_stack: &["ML", "Python", "PyTorch", "PostgreSQL"],
        projects: &[
            ("Japanese Summarizer", "ROUGE-L 0.41", &["Python", "PyTorch", "ML"]),
            ("Feature Store", "Shared by 3 ML teams", &["Python", "PostgreSQL"]),
        ],
    },
    DemoProfile {
        id: 20,
        name: "Kenta Mori",
        location: "Tokyo",
        availability: Availability::Available,
        bio: "Startup generalist who has launched two products.",
        tech_stack: &["React", "Node", "MongoDB", "AWS"],
        projects: &[
            ("Subscription Box Store", "$20k MRR", &["React", "Node", "MongoDB"]),
            ("Team Retro Board", "300 teams onboarded", &["React", "Node", "PostgreSQL"]),
        ],
    },
    DemoProfile {
        id: 21,
        name: "Asuka Ono",
        location: "Yokohama",
        availability: Availability::Open,
        bio: "AI product engineer building retrieval pipelines.",
        tech_stack: &["AI", "Python", "TypeScript", "PostgreSQL"],
        projects: &[("Support Copilot", "Deflects 35% of tickets", &["AI", "Python", "TypeScript"])],
    },
    DemoProfile {
        id: 22,
        name: "Ren Fukuda",
        location: "Sendai",
        availability: Availability::Available,
        bio: "Self-taught JavaScript developer, first job hunt.",
        tech_stack: &["JavaScript", "Vue", "Node"],
        projects: &[("Transit Timetable", "Daily use by 400 students", &["JavaScript", "Vue"])],
    },
    DemoProfile {
        id: 23,
        name: "Yuto Kato",
        location: "Tokyo",
        availability: Availability::Available,
        bio: "Systems programmer writing databases for fun.",
        tech_stack: &["WebAssembly", "Rust", "Go"],
        projects: &[
            ("Embedded KV Store", "Outperforms sled on reads", &["Rust"]),
            ("Edge Function Runtime", "Runs 10k isolates per host", &["Rust", "WebAssembly"]),
        ],
    },
    DemoProfile {
        id: 24,
        name: "Misaki Endo",
        location: "Kobe",
        availability: Availability::NotLooking,
        bio: "Java backend engineer moving into platform work.",
        tech_stack: &["Java", "Kubernetes", "PostgreSQL"],
        projects: &[("Payments Ledger", "Audited for PCI DSS", &["Java", "PostgreSQL"])],
    },
];

/// A built-in roster spanning every cluster, used when no roster file is
/// given.
pub fn demo_roster() -> Vec<Profile> {
    DEMO_PROFILES
        .iter()
        .map(|demo| Profile {
            id: demo.id.to_string(),
            name: demo.name.to_owned(),
            email: format!(
                "{}@example.com",
                demo.name.to_ascii_lowercase().replace(' ', ".")
            ),
            location: demo.location.to_owned(),
            github_url: Some(format!(
                "https://github.com/{}",
                demo.name.to_ascii_lowercase().replace(' ', "")
            )),
            bio: demo.bio.to_owned(),
            availability: demo.availability,
            tech_stack: demo.tech_stack.iter().map(|tag| (*tag).to_owned()).collect(),
            projects: demo
                .projects
                .iter()
                .map(|(title, impact, stack)| Project {
                    title: (*title).to_owned(),
                    description: String::new(),
                    tech_stack: stack.iter().map(|tag| (*tag).to_owned()).collect(),
                    impact: (*impact).to_owned(),
                    github_url: None,
                })
                .collect(),
        })
        .collect()
}
