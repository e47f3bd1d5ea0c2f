use anyhow::{bail, Context};
use msgs::{
    client_server_msg::{EditName, LocationUpdate},
    BusId, ClientServerMsg,
};

pub const HELP: &str = "\
commands:
  move <id> <lat> <lng>             report a new position for a bus
  edit <id> <bus_number> <route>    set bus number and route name (once)
  markers                           list every marker
  show <id>                         show one marker's popup
  help                              this text";

#[derive(Debug, PartialEq)]
pub enum ConsoleCmd {
    Send (ClientServerMsg),
    Markers,
    Show (String),
    Help,
}

impl ConsoleCmd {
    pub fn parse(input: &str) -> anyhow::Result<ConsoleCmd> {
        let (message_type, rem) = match input.find(' ') {
            Some(i) => (&input[..i], input[i+1..].trim()),
            None => (input, ""),
        };

        match message_type {
            "move" => {
                let mut args = rem.split_whitespace();
                let id = parse_id(args.next())?;
                let lat = args.next().context("missing latitude")?.parse::<f64>().context("latitude is not a number")?;
                let lng = args.next().context("missing longitude")?.parse::<f64>().context("longitude is not a number")?;
                if args.next().is_some() {
                    bail!("too many arguments for move");
                }
                Ok(ConsoleCmd::Send(ClientServerMsg::LocationUpdate(LocationUpdate { id, lat, lng })))
            }
            "edit" => {
                let mut args = rem.splitn(3, char::is_whitespace);
                let id = parse_id(args.next())?;
                let new_bus_number = args.next().filter(|s| !s.is_empty()).context("missing bus number")?.to_string();
                let new_route_name = args.next().map(str::trim).filter(|s| !s.is_empty()).context("missing route name")?.to_string();
                Ok(ConsoleCmd::Send(ClientServerMsg::EditName(EditName { id, new_bus_number, new_route_name })))
            }
            "markers" => Ok(ConsoleCmd::Markers),
            "show" => {
                if rem.is_empty() {
                    bail!("missing marker id");
                }
                Ok(ConsoleCmd::Show(rem.to_owned()))
            }
            "help" | "?" => Ok(ConsoleCmd::Help),
            _ => bail!("cmd not recognized, try help"),
        }
    }
}

fn parse_id(arg: Option<&str>) -> anyhow::Result<BusId> {
    let arg = arg.filter(|s| !s.is_empty()).context("missing bus id")?;
    arg.parse::<BusId>().with_context(|| format!("{arg} is not a bus id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        let cmd = ConsoleCmd::parse("move 4 17.5 78.25").unwrap();
        assert_eq!(cmd, ConsoleCmd::Send(ClientServerMsg::LocationUpdate(LocationUpdate { id: 4, lat: 17.5, lng: 78.25 })));
    }

    #[test]
    fn test_parse_edit_keeps_spaces_in_route_name() {
        let cmd = ConsoleCmd::parse("edit 10 10 B.N.Reddy colony").unwrap();
        assert_eq!(
            cmd,
            ConsoleCmd::Send(ClientServerMsg::EditName(EditName {
                id: 10,
                new_bus_number: "10".to_string(),
                new_route_name: "B.N.Reddy colony".to_string(),
            }))
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ConsoleCmd::parse("move x 1 2").is_err());
        assert!(ConsoleCmd::parse("move 1 2").is_err());
        assert!(ConsoleCmd::parse("edit 1 5").is_err());
        assert!(ConsoleCmd::parse("show").is_err());
        assert!(ConsoleCmd::parse("fly 1").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(ConsoleCmd::parse("markers").unwrap(), ConsoleCmd::Markers);
        assert_eq!(ConsoleCmd::parse("show 3").unwrap(), ConsoleCmd::Show("3".to_string()));
        assert_eq!(ConsoleCmd::parse("help").unwrap(), ConsoleCmd::Help);
    }
}
