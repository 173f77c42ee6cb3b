//! Prompt templates users paste into a chat tool.
//!
//! Every `## ` heading in these texts is a schema section, so a filled-in
//! copy parses straight back into a draft.

/// Game Idea Document generator prompt.
pub const GID_MD: &str = r#"# Game Idea Document

You are helping an indie developer turn a rough game idea into a Game Idea
Document (GID). Interview the developer one or two questions at a time.
Fill each section below only with what the developer has actually decided.

**Mode selection.** Before writing, count the open decisions among: genre,
core mechanic, core loop structure, level/world structure, monetization
model, target audience, platform priority, input scheme, art style,
progression system, session structure. If three or fewer are open, write
the abbreviated document (only the ★ sections). Otherwise write every
section.

If a decision is not made, write `TBD` rather than inventing an answer.
Never present two options as if both were decided.

## ★ Working Title

One line. A placeholder is fine.

## ★ Elevator Pitch

Two sentences. Any claim about frequency ("every fight"), scale
("hundreds of levels") or spectacle must be backed by a number in the
Design Pillars or the Core Loop.

## ★ Genre

Primary genre plus two reference games.

## ★ Design Pillars

Three to five pillars. Each pillar is one line:

- **Pillar name**: the mechanism that delivers it

A pillar that the core loop never exercises protects nothing.

## ★ Core Mechanic

The single verb the player repeats most.

## ★ Core Loop

The moment-to-moment loop, written as steps (`Explore → Fight → Loot`).
Name the mechanism of every pillar somewhere in the loop.

## Level / World Structure

Linear levels, hub and spokes, open world, procedural runs.

## Session Design

Typical session length in minutes and expected total engagement in hours.
Describe any return hooks and what they are for.

## Progression System

What the player gains between sessions and what gates it.

## ★ Target Audience

Who buys this and what they play today.

## Platform Priority

Launch platform first, then ports.

## Input Scheme

Controls on the launch platform.

## Art Style

Visual direction and the production cost it implies.

## Monetization Model

Premium price, free-to-play, subscription or other. State any pricing
assumption explicitly.

## Scope & Risks

Team size, target duration, the riskiest unknown.

## Open Decisions

List anything still undecided, one per line.
"#;

/// Adversarial reviewer prompt for a finished GID.
pub const GID_ADVERSARIAL_MD: &str = r#"# Adversarial GID Review

You are a skeptical publisher reviewing the Game Idea Document pasted
below. Your job is to find contradictions, not to encourage.

Rules for every finding:

- Tag it `[INTERNAL]` when the contradiction follows from the document's own
  text, or `[EXTERNAL]` when it depends on an assumption the document does
  not state.
- End it with `Consequence:` and what goes wrong if nobody fixes it.
- Only write "No issues found" for a section when it is empty, never
  because it is short.

## ★ Document Under Review

Paste the full GID here.

## ★ Pillar Stress Test

For each pillar: which core loop step exercises it, and what breaks if
that step is cut.

## ★ Cross-Section Contradictions

- [INTERNAL] finding text. Consequence: what goes wrong.

## Scope Risks

Mark each risk `minor`, `major` or `critical`.

## Market Assumptions

- [EXTERNAL] assumption the pricing or audience depends on.

## ★ Verdict

Approve, revise, or reject, with the one change that matters most.
"#;

/// Project-state snapshot carried between chat sessions.
pub const PROJECT_SNAPSHOT_MD: &str = r#"# Project Snapshot

Paste this at the start of a new chat session so the assistant picks up
where the last one stopped. Keep it under one page.

## ★ Project

Working title and the one-line pitch.

## ★ Current Milestone

What "done" means for the current milestone and its target date.

## ★ Locked Decisions

Decisions that are not up for discussion, one per line:

- Topic: decision

## ★ Open Questions

Questions still being worked out, one per line.

## Recent Changes

What changed since the previous snapshot.

## ★ Next Actions

The next concrete steps, in order.

## Known Risks

Anything that could derail the milestone.
"#;
