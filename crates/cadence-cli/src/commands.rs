//! Command dispatch: each subcommand maps onto one engine operation.

use std::{
  collections::BTreeMap,
  fs,
  io::{self, BufRead as _, Write as _},
};

use anyhow::{Context as _, bail};
use cadence_core::{
  AreaId, RevisionId, TagId, TopicId,
  area::Area,
  revision::DueRevision,
  store::StudyStore,
  topic::{NewTopic, TopicFilter, TopicUpdate},
};
use cadence_engine::Scheduler;
use chrono::{Datelike as _, Local, NaiveDate};
use serde::Serialize;

use crate::{
  Command, LabelCommand, TopicCommand, TopicFields,
  format::{
    area_line, due_line, format_duration, parse_color, parse_date, parse_duration,
    parse_month, revision_line, summary_lines, tag_line, topic_line,
  },
  import::parse_import,
};

/// Print `value` as pretty JSON, or the lines produced by `human`.
fn emit<T: Serialize>(
  json: bool,
  value: &T,
  human: impl FnOnce(&T) -> Vec<String>,
) -> anyhow::Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(value)?);
  } else {
    for line in human(value) {
      println!("{line}");
    }
  }
  Ok(())
}

fn today() -> NaiveDate { Local::now().date_naive() }

fn date_or_today(raw: Option<&str>) -> anyhow::Result<NaiveDate> {
  raw.map(parse_date).transpose().map(|d| d.unwrap_or_else(today))
}

/// Look an area up by name: an exact match wins, otherwise a
/// case-insensitive match is used if exactly one area has it.
fn find_area(areas: &[Area], name: &str) -> anyhow::Result<AreaId> {
  let name = name.trim();
  if let Some(area) = areas.iter().find(|a| a.name == name) {
    return Ok(area.id);
  }
  let folded: Vec<&Area> = areas
    .iter()
    .filter(|a| a.name.to_lowercase() == name.to_lowercase())
    .collect();
  match folded.as_slice() {
    [area] => Ok(area.id),
    [] => bail!("no area named {name:?}"),
    many => bail!(
      "area name {name:?} is ambiguous: {}",
      many.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
    ),
  }
}

fn resolve_area<S: StudyStore>(s: &Scheduler<S>, name: &str) -> anyhow::Result<AreaId> {
  find_area(&s.areas()?, name)
}

fn print_days(json: bool, days: &BTreeMap<NaiveDate, Vec<DueRevision>>) -> anyhow::Result<()> {
  emit(json, days, |days| {
    let mut lines = Vec::new();
    for (day, due) in days {
      lines.push(format!("{day}"));
      lines.extend(due.iter().map(|d| format!("  {}", due_line(d))));
    }
    lines
  })
}

pub fn run<S: StudyStore>(s: &Scheduler<S>, command: Command, json: bool) -> anyhow::Result<()> {
  match command {
    Command::Area(cmd) => run_area(s, cmd, json),
    Command::Tag(cmd) => run_tag(s, cmd, json),
    Command::Topic(cmd) => run_topic(s, cmd, json),

    Command::Today { date } => {
      let date = date_or_today(date.as_deref())?;
      let due = s.revisions_for_date(date)?;
      let summary = s.day_summary(date)?;
      if json {
        println!(
          "{}",
          serde_json::to_string_pretty(&serde_json::json!({
            "summary": summary,
            "revisions": due,
          }))?
        );
      } else {
        summary_lines(&summary).iter().for_each(|l| println!("{l}"));
        println!();
        if due.is_empty() {
          println!("Nothing scheduled.");
        }
        due.iter().for_each(|d| println!("{}", due_line(d)));
      }
      Ok(())
    }

    Command::Calendar { month } => {
      let (year, month) = match month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => {
          let now = today();
          (now.year(), now.month())
        }
      };
      print_days(json, &s.calendar_month(year, month)?)
    }

    Command::Week { date } => {
      print_days(json, &s.calendar_week(date_or_today(date.as_deref())?)?)
    }

    Command::Studied { revision } => {
      s.mark_as_studied(RevisionId(revision))?;
      println!("Revision {revision} marked as studied.");
      Ok(())
    }

    Command::Undo { revision } => {
      s.mark_as_pending(RevisionId(revision))?;
      println!("Revision {revision} is pending again.");
      Ok(())
    }

    Command::Missed { revision } => {
      let id = RevisionId(revision);
      let topic_id = s
        .store()
        .get_revision(id)?
        .with_context(|| format!("no revision {revision}"))?
        .topic_id;
      let schedule = s.mark_as_not_studied(id, topic_id)?;
      emit(json, &schedule, |schedule| {
        let mut lines = vec![format!("Schedule of topic {topic_id} shifted:")];
        lines.extend(schedule.iter().map(revision_line));
        lines
      })
    }

    Command::Session { topic, duration } => {
      let seconds = parse_duration(&duration)?;
      let session = s.register_study_session(TopicId(topic), seconds)?;
      emit(json, &session, |session| {
        vec![format!(
          "Logged {} on topic {}.",
          format_duration(session.duration_seconds),
          session.topic_id
        )]
      })
    }

    Command::Stats { date } => {
      let summary = s.day_summary(date_or_today(date.as_deref())?)?;
      emit(json, &summary, summary_lines)
    }

    Command::Reset { yes } => {
      if !yes {
        bail!("refusing to reset without --yes");
      }
      print!("This deletes every area, tag, topic and study session. Type `reset` to confirm: ");
      io::stdout().flush().ok();
      let mut line = String::new();
      io::stdin().lock().read_line(&mut line)?;
      if line.trim() != "reset" {
        bail!("reset aborted");
      }
      s.reset_database()?;
      println!("Database reset.");
      Ok(())
    }
  }
}

fn run_area<S: StudyStore>(s: &Scheduler<S>, cmd: LabelCommand, json: bool) -> anyhow::Result<()> {
  match cmd {
    LabelCommand::Add { name, color } => {
      let area = s.add_area(&name, parse_color(color.as_deref()).as_ref())?;
      emit(json, &area, |a| vec![area_line(a)])
    }
    LabelCommand::List => emit(json, &s.areas()?, |areas| areas.iter().map(area_line).collect()),
    LabelCommand::Edit { id, name, color, clear_color } => {
      let id = AreaId(id);
      let current = s
        .store()
        .get_area(id)?
        .with_context(|| format!("no area {id}"))?;
      let color = if clear_color {
        None
      } else {
        color.as_deref().map_or(current.color, |c| parse_color(Some(c)))
      };
      let area = s.update_area(id, name.as_deref().unwrap_or(&current.name), color.as_ref())?;
      emit(json, &area, |a| vec![area_line(a)])
    }
    LabelCommand::Rm { id } => {
      s.delete_area(AreaId(id))?;
      println!("Area {id} deleted; its topics are kept without an area.");
      Ok(())
    }
  }
}

fn run_tag<S: StudyStore>(s: &Scheduler<S>, cmd: LabelCommand, json: bool) -> anyhow::Result<()> {
  match cmd {
    LabelCommand::Add { name, color } => {
      let tag = s.add_tag(&name, parse_color(color.as_deref()).as_ref())?;
      emit(json, &tag, |t| vec![tag_line(t)])
    }
    LabelCommand::List => emit(json, &s.tags()?, |tags| tags.iter().map(tag_line).collect()),
    LabelCommand::Edit { id, name, color, clear_color } => {
      let id = TagId(id);
      let current = s
        .tags()?
        .into_iter()
        .find(|t| t.id == id)
        .with_context(|| format!("no tag {id}"))?;
      let color = if clear_color {
        None
      } else {
        color.as_deref().map_or(current.color, |c| parse_color(Some(c)))
      };
      let tag = s.update_tag(id, name.as_deref().unwrap_or(&current.name), color.as_ref())?;
      emit(json, &tag, |t| vec![tag_line(t)])
    }
    LabelCommand::Rm { id } => {
      s.delete_tag(TagId(id))?;
      println!("Tag {id} deleted.");
      Ok(())
    }
  }
}

fn run_topic<S: StudyStore>(s: &Scheduler<S>, cmd: TopicCommand, json: bool) -> anyhow::Result<()> {
  match cmd {
    TopicCommand::Add { title, start, fields } => {
      let TopicFields { area, tags, color, description } = fields;
      let topic = NewTopic {
        title,
        area_id: area.as_deref().map(|a| resolve_area(s, a)).transpose()?,
        start_date: date_or_today(start.as_deref())?,
        tags: tags.unwrap_or_default(),
        color: parse_color(color.as_deref()),
        description: description.unwrap_or_default(),
      };
      let id = s.create_topic_with_revisions(topic)?;
      show_topic(s, id, json)
    }

    TopicCommand::List { search, area } => {
      let filter = TopicFilter {
        text:    search,
        area_id: area.as_deref().map(|a| resolve_area(s, a)).transpose()?,
      };
      let topics = s.search_topics(&filter)?;
      emit(json, &topics, |topics| topics.iter().map(topic_line).collect())
    }

    TopicCommand::Import { file } => {
      let text = fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
      let rows = parse_import(&text)?;
      let areas = s.areas()?;
      let default_start = today();

      let batch = rows
        .into_iter()
        .map(|row| {
          let area_id = row
            .area
            .as_deref()
            .map(|name| find_area(&areas, name))
            .transpose()
            .with_context(|| format!("line {}", row.line))?;
          Ok(NewTopic {
            title: row.title,
            area_id,
            start_date: row.start.unwrap_or(default_start),
            tags: row.tags,
            color: None,
            description: row.description,
          })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

      let ids = s.create_topics_with_revisions(batch)?;
      let topics = ids.into_iter().map(|id| s.topic(id)).collect::<Result<Vec<_>, _>>()?;
      emit(json, &topics, |topics| {
        let mut lines = vec![format!("Imported {} topics.", topics.len())];
        lines.extend(topics.iter().map(topic_line));
        lines
      })
    }

    TopicCommand::Show { id } => show_topic(s, TopicId(id), json),

    TopicCommand::Edit { id, title, fields, no_area, clear_color } => {
      let TopicFields { area, tags, color, description } = fields;
      let area_id = match (no_area, area) {
        (true, _) => Some(None),
        (false, Some(name)) => Some(Some(resolve_area(s, &name)?)),
        (false, None) => None,
      };
      let color = if clear_color {
        Some(None)
      } else {
        color.map(|c| parse_color(Some(&c)))
      };
      let overview = s.update_topic(TopicId(id), TopicUpdate {
        title,
        area_id,
        tags,
        color,
        description,
      })?;
      emit(json, &overview, |o| vec![topic_line(o)])
    }

    TopicCommand::Rm { id } => {
      s.delete_topic(TopicId(id))?;
      println!("Topic {id} deleted; its study time is kept in the totals.");
      Ok(())
    }
  }
}

fn show_topic<S: StudyStore>(s: &Scheduler<S>, id: TopicId, json: bool) -> anyhow::Result<()> {
  let overview = s.topic(id)?;
  let revisions = s.revisions_for_topic(id)?;
  if json {
    println!(
      "{}",
      serde_json::to_string_pretty(&serde_json::json!({
        "topic": overview,
        "revisions": revisions,
      }))?
    );
  } else {
    println!("{}", topic_line(&overview));
    let tags = overview.topic.tag_list();
    if !tags.is_empty() {
      println!("      tags: {}", tags.join(", "));
    }
    if !overview.topic.description.is_empty() {
      println!("      {}", overview.topic.description);
    }
    revisions.iter().for_each(|r| println!("  {}", revision_line(r)));
  }
  Ok(())
}
