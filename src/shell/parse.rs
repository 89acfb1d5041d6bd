use crate::shell::command::Command;

/// 把一行输入解析成命令；命令未知或参数不合法时返回 None。
pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.split_ascii_whitespace().collect();
    let (&cmd, args) = tokens.split_first()?;

    match cmd {
        "help" => Some(Command::Help),
        "format" => Some(Command::Format),
        "mount" => Some(Command::Mount),
        "debug" => Some(Command::Debug),
        "create" => Some(Command::Create),
        "stat" => parse_inumber(args).map(Command::Stat),
        "cat" => parse_inumber(args).map(Command::Cat),
        "remove" => parse_inumber(args).map(Command::Remove),
        "copyin" => {
            let path = args.first()?;
            let inumber = args.get(1)?.parse().ok()?;
            Some(Command::CopyIn(path.to_string(), inumber))
        }
        "copyout" => {
            let inumber = args.first()?.parse().ok()?;
            let path = args.get(1)?;
            Some(Command::CopyOut(inumber, path.to_string()))
        }
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

fn parse_inumber(args: &[&str]) -> Option<u32> {
    args.first()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        assert!(matches!(parse_command("format"), Some(Command::Format)));
        assert!(matches!(parse_command("  mount "), Some(Command::Mount)));
        assert!(matches!(parse_command("debug"), Some(Command::Debug)));
        assert!(matches!(parse_command("quit"), Some(Command::Quit)));
        assert!(matches!(parse_command("exit"), Some(Command::Quit)));
    }

    #[test]
    fn parses_inumber_arguments() {
        assert!(matches!(parse_command("stat 3"), Some(Command::Stat(3))));
        assert!(matches!(parse_command("cat 12"), Some(Command::Cat(12))));
        assert!(matches!(
            parse_command("remove 1"),
            Some(Command::Remove(1))
        ));
    }

    #[test]
    fn parses_copy_commands() {
        match parse_command("copyin notes.txt 2") {
            Some(Command::CopyIn(path, 2)) => assert_eq!(path, "notes.txt"),
            other => panic!("unexpected parse: {:?}", other),
        }
        match parse_command("copyout 2 notes.txt") {
            Some(Command::CopyOut(2, path)) => assert_eq!(path, "notes.txt"),
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_command("").is_none());
        assert!(parse_command("stat").is_none());
        assert!(parse_command("stat abc").is_none());
        assert!(parse_command("copyin onlypath").is_none());
        assert!(parse_command("bogus").is_none());
    }
}
