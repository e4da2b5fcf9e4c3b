/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`. Applied once at
/// startup when the Postgres backend is selected.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id                  UUID PRIMARY KEY,
    user_id             UUID NOT NULL,
    name                TEXT NOT NULL,
    email               TEXT,
    company             TEXT,
    title               TEXT,
    tier                TEXT NOT NULL
        CHECK (tier IN ('succulent', 'fern', 'orchid', 'bonsai')),
    growth_stage        TEXT NOT NULL DEFAULT 'seed'
        CHECK (growth_stage IN ('seed', 'sprout', 'sapling', 'mature', 'ancient')),
    health_score        DOUBLE PRECISION NOT NULL DEFAULT 1.0
        CHECK (health_score >= 0.0 AND health_score <= 1.0),
    decay_rate          DOUBLE PRECISION NOT NULL CHECK (decay_rate > 0.0),
    last_interaction_at TIMESTAMPTZ NOT NULL,
    total_interactions  INTEGER NOT NULL DEFAULT 0 CHECK (total_interactions >= 0),
    is_favorite         BOOLEAN NOT NULL DEFAULT FALSE,
    is_archived         BOOLEAN NOT NULL DEFAULT FALSE,
    tags                TEXT[] NOT NULL DEFAULT '{}',
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS contacts_user_idx ON contacts (user_id) WHERE NOT is_archived;

-- Rows are inserted or deleted, never updated.
CREATE TABLE IF NOT EXISTS interactions (
    id               UUID PRIMARY KEY,
    contact_id       UUID NOT NULL REFERENCES contacts (id) ON DELETE CASCADE,
    user_id          UUID NOT NULL,
    interaction_type TEXT NOT NULL
        CHECK (interaction_type IN ('text', 'call', 'email', 'meeting', 'coffee',
                                    'video_call', 'social_media', 'letter', 'gift', 'other')),
    source           TEXT NOT NULL CHECK (source IN ('manual', 'imported')),
    notes            TEXT,
    sentiment        DOUBLE PRECISION CHECK (sentiment >= -1.0 AND sentiment <= 1.0),
    happened_at      TIMESTAMPTZ NOT NULL,
    duration_minutes INTEGER CHECK (duration_minutes >= 0),
    metadata         JSONB,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS interactions_contact_happened_idx
    ON interactions (contact_id, happened_at DESC);
"#;
