use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Ipv4Addr, TcpListener};
use std::thread;
use std::time::Duration;

use temboo_client::{Choreo, ChoreoConfig, Clock, MonotonicUptime, StdDelay, TcpTransport};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// Reads one request and returns its headers and body.
fn read_request(reader: &mut BufReader<std::net::TcpStream>) -> (Vec<String>, String) {
    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end_matches("\r\n").to_owned();
        if line.is_empty() {
            break;
        }
        headers.push(line);
    }

    let length: usize = headers
        .iter()
        .find_map(|header| header.strip_prefix("Content-Length: "))
        .unwrap()
        .parse()
        .unwrap();
    let mut body = vec![0; length];
    reader.read_exact(&mut body).unwrap();

    (headers, String::from_utf8(body).unwrap())
}

#[test]
fn run_over_tcp() {
    init_tracing();

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let address = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let mut requests = Vec::new();
        for response in [
            "HTTP/1.1 401 Unauthorized\r\nx-temboo-time: 1700000000\r\n\r\n",
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n{\"Response\":\"sunny\"}",
        ] {
            let (socket, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(socket);
            requests.push(read_request(&mut reader));

            let mut socket = reader.into_inner();
            socket.write_all(response.as_bytes()).unwrap();
        }
        requests
    });

    let clock = Clock::new(MonotonicUptime::new());
    let transport = TcpTransport::new().read_timeout(Duration::from_secs(5));
    let config = ChoreoConfig::new().poll_interval(Duration::from_millis(1));
    let mut choreo = Choreo::with_config(transport, &clock, StdDelay, config);
    choreo.set_account_name("acme");
    choreo.set_app_key_name("myFirstApp");
    choreo.set_app_key("0123456789abcdef");
    choreo.set_choreo("/Library/Yahoo/Weather/GetWeatherByAddress");
    choreo.add_input("Address", "104 Franklin St, New York NY 10013");

    choreo.run_with_server(address).unwrap();
    assert_eq!(choreo.http_code(), 200);

    let mut response = String::new();
    choreo.read_to_string(&mut response).unwrap();
    choreo.close();
    assert_eq!(
        response,
        "HTTP_CODE\n\u{1f}200\n\u{1e}{\"Response\":\"sunny\"}"
    );

    let requests = server.join().unwrap();
    assert_eq!(requests.len(), 2);
    for (headers, body) in &requests {
        assert_eq!(
            headers[0],
            "POST /arcturus-web/api-1.0/ar/Library/Yahoo/Weather/GetWeatherByAddress?source_id=arduinoSDK1 HTTP/1.0"
        );
        assert!(headers.contains(&format!("Host: {address}")));
        assert_eq!(
            body,
            r#"{"inputs":{"Address":"104 Franklin St, New York NY 10013"}}"#
        );
    }

    // The second request is timestamped with the server time.
    let time = requests[1]
        .0
        .iter()
        .find_map(|header| header.strip_prefix("x-temboo-time: "))
        .unwrap()
        .parse::<u32>()
        .unwrap();
    assert!(time >= 1_700_000_000);
}

#[test]
fn read_resumes_after_stall() {
    init_tracing();

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let address = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (socket, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(socket);
        read_request(&mut reader);

        let mut socket = reader.into_inner();
        socket.write_all(b"HTTP/1.1 200 OK\r\n\r\nab").unwrap();
        thread::sleep(Duration::from_millis(400));
        socket.write_all(b"cd").unwrap();
    });

    let clock = Clock::new(MonotonicUptime::new());
    let transport = TcpTransport::new().read_timeout(Duration::from_millis(100));
    let config = ChoreoConfig::new().poll_interval(Duration::from_millis(1));
    let mut choreo = Choreo::with_config(transport, &clock, StdDelay, config);
    choreo.set_account_name("acme");
    choreo.set_app_key_name("myFirstApp");
    choreo.set_app_key("0123456789abcdef");
    choreo.set_choreo("/Library/Test");

    choreo.run_with_server(address).unwrap();

    let mut response = Vec::new();
    let mut stalls = 0;
    loop {
        match choreo.read_to_end(&mut response) {
            Ok(_) => break,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                stalls += 1;
                assert!(stalls < 50, "response never completed");
            }
            Err(e) => panic!("read failed: {e}"),
        }
    }
    server.join().unwrap();

    assert!(stalls > 0);
    assert_eq!(response, b"HTTP_CODE\n\x1F200\n\x1Eabcd");
}
