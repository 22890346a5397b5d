use crate::config::LayoutConfig;
use crate::geometry::ConnectionLayout;
use crate::ir::Entity;
use crate::layout::LayoutStrategy;
use crate::layout::normalize::{card_left, card_top};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Flat snapshot of a layout run, for diffing engines against each other.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub strategy: String,
    pub entities: Vec<EntityDump>,
    pub connections: Vec<ConnectionDump>,
}

#[derive(Debug, Serialize)]
pub struct EntityDump {
    pub id: String,
    pub generation: f32,
    pub x: f32,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub gap: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectionDump {
    pub relation: String,
    pub emphasis: &'static str,
    pub origin: [f32; 2],
    pub marriage_node: Option<[f32; 2]>,
    pub paths: Vec<PathDump>,
}

#[derive(Debug, Serialize)]
pub struct PathDump {
    pub kind: &'static str,
    pub child: Option<String>,
    pub dashed: bool,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(
        strategy: LayoutStrategy,
        entities: &[Entity],
        connections: &[ConnectionLayout],
        config: &LayoutConfig,
    ) -> Self {
        let entities = entities
            .iter()
            .map(|entity| {
                let gap = entity.is_gap();
                let (width, height) = if gap {
                    (config.gap_node_size, config.gap_node_size)
                } else {
                    (config.card_width, config.card_height)
                };
                EntityDump {
                    id: entity.id.clone(),
                    generation: entity.generation,
                    x: entity.x,
                    left: card_left(entity, config),
                    top: card_top(entity, config),
                    width,
                    height,
                    gap,
                }
            })
            .collect();

        let connections = connections
            .iter()
            .map(|connection| ConnectionDump {
                relation: connection.relation_id.clone(),
                emphasis: connection.emphasis.as_str(),
                origin: [connection.origin.0, connection.origin.1],
                marriage_node: connection.marriage_node.map(|(x, y)| [x, y]),
                paths: connection
                    .paths
                    .iter()
                    .map(|path| PathDump {
                        kind: path.kind.as_str(),
                        child: path.child_id.clone(),
                        dashed: path.dashed,
                        points: path.points.iter().map(|(x, y)| [*x, *y]).collect(),
                    })
                    .collect(),
            })
            .collect();

        LayoutDump {
            strategy: strategy.name().to_string(),
            entities,
            connections,
        }
    }
}

/// Write the dump as pretty JSON to `path`, or stdout when `path` is `None`.
pub fn write_layout_dump(dump: &LayoutDump, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
